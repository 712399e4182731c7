// handlers/internal/quoting.rs - /api/quotes, /api/applicants, /api/groups

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{info, warn};

use crate::auth::Principal;
use crate::client::ClientError;
use crate::database::models::{
    Applicant, CreateApplicant, CreateGroup, CreateQuote, Group, NewQuote, Quote, TemplateStatus,
};
use crate::database::Filter;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::ServiceKind;

/// GET /api/quotes
pub async fn list_quotes(State(state): State<AppState>) -> ApiResult<Vec<Quote>> {
    let quotes = state.storage.quotes.list(&Filter::all()).await?;
    Ok(ApiResponse::success(quotes))
}

/// POST /api/quotes - quoting or admin. The template must exist in the
/// benefit designer, be active, and match the quote's plan type.
pub async fn create_quote(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateQuote>, JsonRejection>,
) -> ApiResult<Quote> {
    let new = json_body(body)?.validate()?;
    check_template(&state, &principal, &new).await?;

    let quote = state.storage.quotes.insert(new).await?;
    info!(quote_id = quote.id, template_id = quote.template_id, "Created quote");
    Ok(ApiResponse::created(quote))
}

async fn check_template(state: &AppState, principal: &Principal, quote: &NewQuote) -> Result<(), ApiError> {
    let token = state.token_for(principal, ServiceKind::BenefitDesigner)?;

    let template = match state.benefit_designer.get_template(quote.template_id, Some(&token)).await {
        Ok(template) => template,
        Err(ClientError::Upstream { status: 404, .. }) => {
            return Err(ApiError::bad_request(format!("Template {} does not exist", quote.template_id)));
        }
        Err(e) => {
            warn!(template_id = quote.template_id, "Template lookup failed: {}", e);
            return Err(e.into());
        }
    };

    if template.status != TemplateStatus::Active {
        return Err(ApiError::bad_request(format!(
            "Template {} is {}, not active",
            template.id,
            template.status.as_str()
        )));
    }
    if template.plan_type != quote.plan_type {
        return Err(ApiError::bad_request(format!(
            "Template {} is for {} plans",
            template.id,
            template.plan_type.as_str()
        )));
    }
    Ok(())
}

/// GET /api/applicants
pub async fn list_applicants(State(state): State<AppState>) -> ApiResult<Vec<Applicant>> {
    let applicants = state.storage.applicants.list(&Filter::all()).await?;
    Ok(ApiResponse::success(applicants))
}

/// POST /api/applicants - quoting or admin
pub async fn create_applicant(
    State(state): State<AppState>,
    body: Result<Json<CreateApplicant>, JsonRejection>,
) -> ApiResult<Applicant> {
    let new = json_body(body)?.validate()?;
    let applicant = state.storage.applicants.insert(new).await?;
    info!(applicant_id = applicant.id, "Created applicant");
    Ok(ApiResponse::created(applicant))
}

/// GET /api/groups
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Vec<Group>> {
    let groups = state.storage.groups.list(&Filter::all()).await?;
    Ok(ApiResponse::success(groups))
}

/// POST /api/groups - quoting or admin
pub async fn create_group(
    State(state): State<AppState>,
    body: Result<Json<CreateGroup>, JsonRejection>,
) -> ApiResult<Group> {
    let new = json_body(body)?.validate()?;
    let group = state.storage.groups.insert(new).await?;
    info!(group_id = group.id, "Created group");
    Ok(ApiResponse::created(group))
}
