use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::auth::{Principal, RoleRequirement};
use crate::error::ApiError;

/// Role gate. Must run after a layer that inserts the [`Principal`].
pub async fn require_roles(
    State(required): State<RoleRequirement>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::unauthenticated("A service token is required for this operation"))?;

    if !required.is_satisfied_by(&principal.roles) {
        info!(user_id = principal.user_id, required = %required, "Role check failed");
        return Err(ApiError::forbidden(format!("Requires one of the roles: {}", required)));
    }

    Ok(next.run(request).await)
}
