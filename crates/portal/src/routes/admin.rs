//! Admin customer management handlers.
//!
//! Every handler takes [`RequireAdmin`], so a missing or wrong bearer token
//! is rejected before any store access.

use axum::extract::{Path, State};
use serde_json::{Map, Value};

use broker_portal_core::CustomerId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Customer;
use crate::response::{ApiJson, ApiResponse, Empty};
use crate::services::CustomerService;
use crate::state::AppState;

/// Parse a path ID. Anything that is not an integer cannot name a customer.
fn parse_id(raw: &str) -> Result<CustomerId> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Customer not found".to_string()))
}

/// List all customers.
///
/// GET /api/customers
pub async fn list(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Customer>>> {
    let customers = CustomerService::new(state.store()).list_all().await?;
    Ok(ApiResponse::list(customers))
}

/// Get a single customer.
///
/// GET /api/customers/{id}
pub async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Customer>> {
    let customer = CustomerService::new(state.store())
        .get_by_id(parse_id(&id)?)
        .await?;
    Ok(ApiResponse::ok(customer))
}

/// Update a customer. The password is not updatable here.
///
/// PUT /api/customers/{id}
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<ApiResponse<Customer>> {
    let customer = CustomerService::new(state.store())
        .update_by_id(parse_id(&id)?, body)
        .await?;
    Ok(ApiResponse::ok(customer))
}

/// Permanently delete a customer.
///
/// DELETE /api/customers/{id}
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Empty>> {
    CustomerService::new(state.store())
        .delete_by_id(parse_id(&id)?)
        .await?;
    Ok(ApiResponse::message("Customer deleted"))
}
