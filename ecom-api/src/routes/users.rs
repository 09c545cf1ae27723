/// User endpoints
///
/// # Endpoints
///
/// - `POST /users` - Register a customer account
/// - `GET /users/me` - The authenticated caller
/// - `GET /users/:id` - Public profile lookup
///
/// Password hashes never leave the server: `User` skips the field when
/// serialized.

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
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, User, UserRole},
    store::UserStore,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
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
}

/// Hashes the password off the async workers and stores the user
pub(crate) async fn create_account(
    state: &AppState,
    req: RegisterRequest,
    role: UserRole,
) -> ApiResult<User> {
    let plain = req.password;
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??;

    let user = state
        .store
        .create_user(CreateUser {
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            role,
        })
        .await?;

    info!(user_id = user.id, role = user.role.as_str(), "User created");
    Ok(user)
}

/// Register a new customer
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret123",
///   "first_name": "Asha",
///   "last_name": "Rao",
///   "phone_number": "+91 98765 43210"
/// }
/// ```
///
/// The new account always has the `user` role.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(req) = payload?;
    req.validate()?;

    let user = create_account(&state, req, UserRole::User).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// The authenticated caller
pub async fn me(auth: AuthContext) -> Json<User> {
    Json(auth.user)
}

/// Look up a user by ID
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
