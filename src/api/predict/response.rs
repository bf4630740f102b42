// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live guess response types

use serde::{Deserialize, Serialize};

use crate::vision::Prediction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub guess: String,
    /// 1 = acceptable, 0 = not; omitted when the model was unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethics: Option<u8>,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            ethics: prediction.ethics_flag(),
            guess: prediction.guess,
        }
    }
}
