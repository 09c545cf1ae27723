/// Order endpoints
///
/// # Endpoints
///
/// - `POST /orders` - Place an order for the caller
/// - `GET /orders/:id` - Fetch an order with its lines (owner or admin)

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
    checkout::{self, PlaceOrder},
    models::order::Order,
    store::OrderStore,
};

/// Place an order
///
/// # Endpoint
///
/// ```text
/// POST /orders
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "shipping_address_id": 1,
///   "billing_address_id": 1,
///   "items": [
///     { "product_id": 10, "quantity": 3 },
///     { "product_id": 11, "quantity": 2 }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Quantity not positive, or no items
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Unknown address or product
/// - `500 Internal Server Error`: The order could not be stored
pub async fn place_order(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<PlaceOrder>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let Json(request) = payload?;

    let order = checkout::place_order(&*state.store, auth.user_id(), request).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Fetch an order
///
/// # Errors
///
/// - `403 Forbidden`: Caller neither placed the order nor is an admin
/// - `404 Not Found`: No such order
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Order>> {
    let order = state
        .store
        .find_order(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    require_owner_or_admin(&auth.user, order.user_id)?;

    Ok(Json(order))
}
