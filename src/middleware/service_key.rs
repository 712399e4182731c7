use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::bearer_token;
use crate::auth::{Principal, SERVICE_KEY_HEADER};
use crate::error::ApiError;
use crate::state::AppState;

/// Gate for internal routes.
///
/// Rejects the request unless `X-Service-Key` matches the shared key. A
/// bearer service token, when present, must verify and be addressed to
/// this service; its claims become the request's [`Principal`].
pub async fn require_service_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request.headers().get(SERVICE_KEY_HEADER).map(|v| v.to_str());

    match presented {
        None => return Err(ApiError::unauthorized("Missing X-Service-Key header")),
        Some(Ok(key)) if state.service_key.matches(key) => {}
        Some(_) => {
            warn!(path = %request.uri().path(), "Rejected internal call with invalid service key");
            return Err(ApiError::unauthorized("Invalid service key"));
        }
    }

    if let Some(token) = bearer_token(request.headers())? {
        let claims = state
            .verifier
            .verify_service_token(&token, state.service().as_str())
            .map_err(|e| {
                warn!(path = %request.uri().path(), "Rejected service token: {}", e);
                ApiError::from(e)
            })?;
        request.extensions_mut().insert(Principal::from(claims));
    }

    Ok(next.run(request).await)
}
