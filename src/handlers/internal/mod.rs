// handlers/internal - service-to-service CRUD behind `require_service_key`
//
// Reads need only the shared key. Creates additionally pass a role gate,
// so they need a service token naming this service.

pub mod customers;
pub mod policies;
pub mod quoting;
pub mod templates;
pub mod users;

use axum::extract::{rejection::PathRejection, Path};

use crate::error::ApiError;

pub(crate) fn path_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request("Record id must be an integer"))
}
