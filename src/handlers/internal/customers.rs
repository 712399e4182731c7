// handlers/internal/customers.rs - /api/customers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use crate::database::models::{CreateCustomer, Customer};
use crate::database::Filter;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/customers
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    let customers = state.storage.customers.list(&Filter::all()).await?;
    Ok(ApiResponse::success(customers))
}

/// POST /api/customers - customer_service or admin
pub async fn create_customer(
    State(state): State<AppState>,
    body: Result<Json<CreateCustomer>, JsonRejection>,
) -> ApiResult<Customer> {
    let new = json_body(body)?.validate()?;
    let customer = state.storage.customers.insert(new).await?;
    info!(customer_id = customer.id, "Created customer");
    Ok(ApiResponse::created(customer))
}
