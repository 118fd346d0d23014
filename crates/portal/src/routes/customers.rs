//! Customer self-service route handlers.
//!
//! Registration is public. Profile routes act on the customer held in the
//! session; there is no ID in the path.

use axum::extract::State;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::RequireCustomer;
use crate::models::{Customer, CustomerPatch, ProfileUpdate, Registration};
use crate::response::{ApiJson, ApiResponse, Empty};
use crate::services::CustomerService;
use crate::state::AppState;

/// Change-password request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Register a new customer.
///
/// POST /api/customers/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Registration>,
) -> Result<ApiResponse<Customer>> {
    let customer = CustomerService::new(state.store()).register(&body).await?;
    Ok(ApiResponse::created(customer))
}

/// Get the signed-in customer's profile.
///
/// GET /api/customers/profile
pub async fn profile(
    State(state): State<AppState>,
    RequireCustomer(current): RequireCustomer,
) -> Result<ApiResponse<Customer>> {
    let customer = CustomerService::new(state.store())
        .get_profile(current.id)
        .await?;
    Ok(ApiResponse::ok(customer))
}

/// Update the signed-in customer's profile.
///
/// PUT /api/customers/profile
pub async fn update_profile(
    State(state): State<AppState>,
    RequireCustomer(current): RequireCustomer,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<ApiResponse<Customer>> {
    let customer = CustomerService::new(state.store())
        .update_profile(current.id, &CustomerPatch::from(body))
        .await?;
    Ok(ApiResponse::ok(customer))
}

/// Change the signed-in customer's password.
///
/// PUT /api/customers/profile/password
pub async fn change_password(
    State(state): State<AppState>,
    RequireCustomer(current): RequireCustomer,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<ApiResponse<Empty>> {
    let (Some(current_password), Some(new_password)) =
        (body.current_password, body.new_password)
    else {
        return Err(AppError::Validation(vec![
            "Current password and new password are required".to_string(),
        ]));
    };

    CustomerService::new(state.store())
        .change_password(current.id, &current_password, &new_password)
        .await?;

    Ok(ApiResponse::message("Password updated"))
}
