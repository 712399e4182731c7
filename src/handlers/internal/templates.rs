// handlers/internal/templates.rs - /api/templates

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};
use tracing::info;

use super::path_id;
use crate::database::models::{CreateTemplate, Template, TemplateQuery};
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/templates?type=&status=&latest= - `latest=true` keeps the
/// highest version of each template name
pub async fn list_templates(State(state): State<AppState>, Query(query): Query<TemplateQuery>) -> ApiResult<Vec<Template>> {
    let filter = query.into_filter()?;
    let templates = state.storage.templates.list(&filter).await?;
    Ok(ApiResponse::success(templates))
}

/// GET /api/templates/:id
pub async fn get_template(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Template> {
    let id = path_id(id)?;
    let template = state
        .storage
        .templates
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Template {} not found", id)))?;
    Ok(ApiResponse::success(template))
}

/// POST /api/templates - benefit_designer or admin
pub async fn create_template(
    State(state): State<AppState>,
    body: Result<Json<CreateTemplate>, JsonRejection>,
) -> ApiResult<Template> {
    let new = json_body(body)?.validate()?;
    let template = state.storage.templates.insert(new).await?;
    info!(template_id = template.id, name = %template.name, version = template.version, "Created template");
    Ok(ApiResponse::created(template))
}
