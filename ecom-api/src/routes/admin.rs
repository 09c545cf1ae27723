/// Administrator user management
///
/// Both endpoints sit behind the bearer and admin layers.
///
/// # Endpoints
///
/// - `POST /admin/users` - Create a user with an explicit role
/// - `DELETE /admin/users/:id` - Delete a user with their addresses and orders

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::{create_account, RegisterRequest},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use ecom_shared::{
    auth::middleware::AuthContext,
    models::user::{User, UserRole},
    store::UserStore,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Admin-created account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(max = 64, message = "Phone number is too long"))]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub role: UserRole,
}

impl CreateUserRequest {
    fn into_account(self) -> (RegisterRequest, UserRole) {
        let account = RegisterRequest {
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
        };
        (account, self.role)
    }
}

/// Create a user with any role
///
/// # Errors
///
/// - `403 Forbidden`: Caller isn't an admin
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(req) = payload?;
    req.validate()?;

    let (account, role) = req.into_account();
    let user = create_account(&state, account, role).await?;
    info!(admin_id = auth.user_id(), user_id = user.id, "Admin created user");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete a user
///
/// Addresses and orders of the user go with it.
///
/// # Errors
///
/// - `403 Forbidden`: Caller isn't an admin
/// - `404 Not Found`: No such user
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !state.store.delete_user(id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(admin_id = auth.user_id(), user_id = id, "Admin deleted user");
    Ok(StatusCode::NO_CONTENT)
}
