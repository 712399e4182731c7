// handlers/internal/policies.rs - /api/policies and its individual/group tables

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use crate::database::models::{
    CreateGroupPolicy, CreateIndividualPolicy, GroupPolicy, IndividualPolicy, PolicyBook,
};
use crate::database::Filter;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/policies - both policy tables, read concurrently
pub async fn list_policies(State(state): State<AppState>) -> ApiResult<PolicyBook> {
    let filter = Filter::all();
    let (individual, group) = futures::try_join!(
        state.storage.individual_policies.list(&filter),
        state.storage.group_policies.list(&filter),
    )?;
    Ok(ApiResponse::success(PolicyBook { individual, group }))
}

/// GET /api/policies/individual
pub async fn list_individual_policies(State(state): State<AppState>) -> ApiResult<Vec<IndividualPolicy>> {
    let policies = state.storage.individual_policies.list(&Filter::all()).await?;
    Ok(ApiResponse::success(policies))
}

/// POST /api/policies/individual
pub async fn create_individual_policy(
    State(state): State<AppState>,
    body: Result<Json<CreateIndividualPolicy>, JsonRejection>,
) -> ApiResult<IndividualPolicy> {
    let new = json_body(body)?.validate()?;
    let policy = state.storage.individual_policies.insert(new).await?;
    info!(policy_id = policy.id, customer_id = policy.customer_id, "Created individual policy");
    Ok(ApiResponse::created(policy))
}

/// GET /api/policies/group
pub async fn list_group_policies(State(state): State<AppState>) -> ApiResult<Vec<GroupPolicy>> {
    let policies = state.storage.group_policies.list(&Filter::all()).await?;
    Ok(ApiResponse::success(policies))
}

/// POST /api/policies/group
pub async fn create_group_policy(
    State(state): State<AppState>,
    body: Result<Json<CreateGroupPolicy>, JsonRejection>,
) -> ApiResult<GroupPolicy> {
    let new = json_body(body)?.validate()?;
    let policy = state.storage.group_policies.insert(new).await?;
    info!(policy_id = policy.id, "Created group policy");
    Ok(ApiResponse::created(policy))
}
