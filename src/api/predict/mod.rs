// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live sketch guessing endpoint module
//!
//! Provides POST /api/predict, polled by the controller screen while the
//! artist is drawing.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::predict_handler;
pub use request::PredictRequest;
pub use response::PredictResponse;
