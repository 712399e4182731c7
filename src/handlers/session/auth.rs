// handlers/session/auth.rs - POST /api/auth/service-token, GET /api/auth/session

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{Principal, TokenError};
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::ServiceKind;

#[derive(Debug, Deserialize)]
pub struct ServiceTokenRequest {
    pub service: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub service: ServiceKind,
}

/// POST /api/auth/service-token - mint a 15 minute token for calling `service`
/// as the signed-in user
pub async fn service_token(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<ServiceTokenRequest>, JsonRejection>,
) -> ApiResult<ServiceTokenResponse> {
    let request = json_body(body)?;

    let name = request
        .service
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(TokenError::MissingService)?;
    let service: ServiceKind = name.parse().map_err(|e| ApiError::bad_request(format!("{}", e)))?;

    let issued = state.issuer.issue(&principal, service.as_str())?;
    let expires_at = DateTime::from_timestamp(issued.claims.exp, 0)
        .ok_or_else(|| ApiError::internal_server_error("Failed to issue token"))?;

    info!(user_id = principal.user_id, service = %service, "Issued service token");

    Ok(ApiResponse::success(ServiceTokenResponse {
        token: issued.token,
        expires_at,
        service,
    }))
}

/// GET /api/auth/session - the signed-in user with roles as currently granted
pub async fn session(State(state): State<AppState>, Extension(principal): Extension<Principal>) -> ApiResult<Principal> {
    let Some(user) = state.storage.users.find(principal.user_id).await? else {
        warn!(user_id = principal.user_id, "Session names a user that is not in the directory");
        return Err(ApiError::unauthenticated("Unknown user"));
    };

    Ok(ApiResponse::success(Principal {
        user_id: user.user.id,
        email: user.user.email,
        roles: user.roles,
    }))
}
