// handlers/mod.rs - three handler tiers
//
// Public (no auth) → Session (browser session token) → Internal (X-Service-Key,
// optional service token, role gates on writes)

pub mod internal;
pub mod public;
pub mod session;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;

/// Unwrap a JSON body, turning axum's rejection into our error envelope
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}
