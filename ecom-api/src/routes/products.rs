/// Product catalogue endpoints
///
/// Reads are public. Writes sit behind the bearer and admin layers.
///
/// # Endpoints
///
/// - `POST /products` - Create a product
/// - `GET /products/:id` - Fetch a product
/// - `PATCH /products/:id` - Partial update, `null` clears nullable fields
/// - `DELETE /products/:id` - Delete a product nobody has ordered

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
    auth::middleware::AuthContext,
    models::product::{double_option, CreateProduct, Product, UpdateProduct},
    store::ProductStore,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Product creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Category is required"))]
    pub category_name: String,

    #[validate(length(max = 255, message = "Subcategory is too long"))]
    pub subcategory_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub description: String,

    #[validate(length(max = 255, message = "Brand is too long"))]
    pub brand: Option<String>,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[validate(range(min = 0.0, message = "Discount price must not be negative"))]
    pub discount_price: Option<f64>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CreateProductRequest> for CreateProduct {
    fn from(req: CreateProductRequest) -> Self {
        CreateProduct {
            category_name: req.category_name,
            subcategory_name: req.subcategory_name,
            name: req.name,
            description: req.description,
            brand: req.brand,
            price: req.price,
            discount_price: req.discount_price,
            is_active: req.is_active,
        }
    }
}

/// Partial product update request
///
/// Absent fields are left alone. `null` clears the nullable ones
/// (`subcategory_name`, `brand`, `discount_price`).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Category must not be empty"))]
    pub category_name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255, message = "Subcategory is too long"))]
    pub subcategory_name: Option<Option<String>>,

    #[validate(length(min = 1, max = 255, message = "Name must not be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255, message = "Brand is too long"))]
    pub brand: Option<Option<String>>,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(min = 0.0, message = "Discount price must not be negative"))]
    pub discount_price: Option<Option<f64>>,

    pub is_active: Option<bool>,
}

impl From<UpdateProductRequest> for UpdateProduct {
    fn from(req: UpdateProductRequest) -> Self {
        UpdateProduct {
            category_name: req.category_name,
            subcategory_name: req.subcategory_name,
            name: req.name,
            description: req.description,
            brand: req.brand,
            price: req.price,
            discount_price: req.discount_price,
            is_active: req.is_active,
        }
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Product with ID {} not found", id))
}

/// Create a product
///
/// # Errors
///
/// - `403 Forbidden`: Caller isn't an admin
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(req) = payload?;
    req.validate()?;

    let product = state.store.create_product(req.into()).await?;
    info!(admin_id = auth.user_id(), product_id = product.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Fetch a product
///
/// # Errors
///
/// - `404 Not Found`: No such product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    let product = state
        .store
        .find_product(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(product))
}

/// Update some fields of a product
///
/// # Errors
///
/// - `403 Forbidden`: Caller isn't an admin
/// - `404 Not Found`: No such product
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Json(req) = payload?;
    req.validate()?;

    let product = state
        .store
        .update_product(id, req.into())
        .await?
        .ok_or_else(|| not_found(id))?;
    info!(admin_id = auth.user_id(), product_id = id, "Product updated");

    Ok(Json(product))
}

/// Delete a product
///
/// # Errors
///
/// - `403 Forbidden`: Caller isn't an admin
/// - `404 Not Found`: No such product
/// - `409 Conflict`: An order line still references the product
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !state.store.delete_product(id).await? {
        return Err(not_found(id));
    }

    info!(admin_id = auth.user_id(), product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
