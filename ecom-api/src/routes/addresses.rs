/// Address endpoints
///
/// # Endpoints
///
/// - `POST /addresses` - Create an address owned by the caller
/// - `GET /addresses/:id` - Fetch an address (owner or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use ecom_shared::{
    auth::{authorization::require_owner_or_admin, middleware::AuthContext},
    models::address::{default_country, Address, CreateAddress},
    store::AddressStore,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Address creation request. The owner comes from the token.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 255, message = "Address line is required"))]
    pub address_line1: String,

    #[validate(length(max = 255))]
    pub address_line2: Option<String>,

    #[validate(length(min = 1, max = 255, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, max = 255, message = "State is required"))]
    pub state: String,

    #[serde(default = "default_country")]
    #[validate(length(min = 1, max = 255))]
    pub country: String,

    #[validate(length(min = 1, max = 32, message = "Postal code is required"))]
    pub postal_code: String,

    #[serde(default)]
    pub is_default_shipping: bool,

    #[serde(default)]
    pub is_default_billing: bool,
}

impl From<CreateAddressRequest> for CreateAddress {
    fn from(req: CreateAddressRequest) -> Self {
        CreateAddress {
            address_line1: req.address_line1,
            address_line2: req.address_line2,
            city: req.city,
            state: req.state,
            country: req.country,
            postal_code: req.postal_code,
            is_default_shipping: req.is_default_shipping,
            is_default_billing: req.is_default_billing,
        }
    }
}

/// Create an address for the caller
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_address(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CreateAddressRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Address>)> {
    let Json(req) = payload?;
    req.validate()?;

    let address = state
        .store
        .create_address(auth.user_id(), req.into())
        .await?;
    info!(user_id = auth.user_id(), address_id = address.id, "Address created");

    Ok((StatusCode::CREATED, Json(address)))
}

/// Fetch an address
///
/// # Errors
///
/// - `403 Forbidden`: Caller neither owns the address nor is an admin
/// - `404 Not Found`: No such address
pub async fn get_address(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Address>> {
    let address = state
        .store
        .find_address(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Address not found".to_string()))?;

    require_owner_or_admin(&auth.user, address.user_id)?;

    Ok(Json(address))
}
