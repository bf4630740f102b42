// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod generate;
pub mod http_server;
pub mod predict;

pub use errors::{ApiError, ErrorResponse, GENERATION_FAILED_MESSAGE};
pub use generate::{generate_handler, GenerateRequest, GenerateResponse};
pub use http_server::{create_router, start_server, AppState};
pub use predict::{predict_handler, PredictRequest, PredictResponse};
