// handlers/session/templates_proxy.rs - GET /api/templates-proxy
//
// Fronts the benefit designer for the browser. The downstream response is
// relayed as-is; only failures are rewritten into the error envelope.

use axum::{
    extract::{Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::auth::Principal;
use crate::client::{BenefitDesignerClient, ClientError, RawResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{PlanType, ServiceKind};

const DETAILS_LIMIT: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub plan_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSelection {
    ById(i32),
    ActiveOfType(PlanType),
}

impl TemplateSelection {
    /// `id` wins over `type`; an absent or unknown `type` means individual
    pub fn from_query(query: &ProxyQuery) -> Result<Self, ApiError> {
        if let Some(id) = query.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let id = id
                .parse::<i32>()
                .map_err(|_| ApiError::bad_request(format!("Template id must be an integer, got '{}'", id)))?;
            return Ok(TemplateSelection::ById(id));
        }

        let plan_type = query
            .plan_type
            .as_deref()
            .and_then(PlanType::parse)
            .unwrap_or(PlanType::Individual);
        Ok(TemplateSelection::ActiveOfType(plan_type))
    }

    pub fn downstream_path(&self) -> String {
        match self {
            TemplateSelection::ById(id) => BenefitDesignerClient::template_path(*id),
            TemplateSelection::ActiveOfType(plan_type) => BenefitDesignerClient::active_templates_path(*plan_type),
        }
    }
}

pub async fn templates_proxy(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ApiError> {
    let selection = TemplateSelection::from_query(&query)?;
    let token = state.token_for(&principal, ServiceKind::BenefitDesigner)?;
    let path = selection.downstream_path();

    let response = match state.benefit_designer.fetch_raw(&path, Some(&token)).await {
        Ok(raw) if raw.status.is_success() => relay(raw),
        Ok(raw) => relay_failure(raw),
        Err(err) => unreachable_upstream(&state, &path, err),
    };
    Ok(response)
}

fn relay(raw: RawResponse) -> Response {
    let content_type = raw.content_type.unwrap_or_else(|| "application/json".to_string());
    (
        raw.status,
        [(CONTENT_TYPE, content_type), (CACHE_CONTROL, "no-store".to_string())],
        raw.body,
    )
        .into_response()
}

fn relay_failure(raw: RawResponse) -> Response {
    warn!(url = %raw.url, status = %raw.status, "Benefit designer returned an error");

    let details: String = String::from_utf8_lossy(&raw.body).chars().take(DETAILS_LIMIT).collect();
    let body = json!({
        "success": false,
        "error": "UPSTREAM_ERROR",
        "message": format!("Benefit designer responded with {}", raw.status),
        "details": details,
    });
    (raw.status, Json(body)).into_response()
}

fn unreachable_upstream(state: &AppState, path: &str, err: ClientError) -> Response {
    let client = state.benefit_designer.service();
    let url = client.url(path);
    error!(%url, "Template proxy request failed: {}", err);

    let mut body = json!({
        "success": false,
        "error": "PROXY_ERROR",
        "message": "Failed to reach the benefit designer service",
    });
    if state.config.security.expose_upstream_diagnostics {
        body["url"] = json!(url);
        body["baseUrl"] = json!(client.base_url());
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(id: Option<&str>, plan_type: Option<&str>) -> ProxyQuery {
        ProxyQuery {
            id: id.map(str::to_string),
            plan_type: plan_type.map(str::to_string),
        }
    }

    #[test]
    fn id_takes_precedence_over_type() {
        let selection = TemplateSelection::from_query(&query(Some("7"), Some("group"))).unwrap();
        assert_eq!(selection, TemplateSelection::ById(7));
        assert_eq!(selection.downstream_path(), "/api/templates/7");
    }

    #[test]
    fn non_integer_id_is_rejected() {
        let err = TemplateSelection::from_query(&query(Some("7; DROP"), None)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_or_missing_type_falls_back_to_individual() {
        for plan_type in [None, Some("family"), Some("")] {
            let selection = TemplateSelection::from_query(&query(None, plan_type)).unwrap();
            assert_eq!(
                selection.downstream_path(),
                "/api/templates?type=individual&status=active&latest=true"
            );
        }
        let group = TemplateSelection::from_query(&query(Some(""), Some("group"))).unwrap();
        assert_eq!(group, TemplateSelection::ActiveOfType(PlanType::Group));
    }
}
