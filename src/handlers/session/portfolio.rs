// handlers/session/portfolio.rs - GET /api/portfolio

use axum::{extract::State, Extension};
use serde::Serialize;
use tracing::warn;

use crate::auth::Principal;
use crate::database::models::{Applicant, Group, Quote};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::ServiceKind;

#[derive(Debug, Serialize)]
pub struct Portfolio {
    pub quotes: Vec<Quote>,
    pub applicants: Vec<Applicant>,
    pub groups: Vec<Group>,
}

/// GET /api/portfolio - quotes, applicants and groups from the quoting
/// service, fetched concurrently. Any failed call fails the whole response.
pub async fn portfolio(State(state): State<AppState>, Extension(principal): Extension<Principal>) -> ApiResult<Portfolio> {
    let token = state.token_for(&principal, ServiceKind::Quoting)?;
    let quoting = &state.quoting;

    let (quotes, applicants, groups) = futures::try_join!(
        quoting.list_quotes(Some(&token)),
        quoting.list_applicants(Some(&token)),
        quoting.list_groups(Some(&token)),
    )
    .map_err(|e| {
        warn!(user_id = principal.user_id, "Portfolio fan-out failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(ApiResponse::success(Portfolio {
        quotes,
        applicants,
        groups,
    }))
}
