use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::bearer_token;
use crate::auth::{Principal, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Gate for browser-facing routes: requires a valid session token
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?.ok_or_else(|| ApiError::unauthenticated("Not signed in"))?;

    let claims = state.verifier.verify_session(&token).map_err(|e| match e {
        TokenError::Expired => ApiError::unauthenticated("Session has expired"),
        _ => ApiError::unauthenticated("Invalid session token"),
    })?;

    request.extensions_mut().insert(Principal::from(claims));
    Ok(next.run(request).await)
}
