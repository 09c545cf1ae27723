/// Authentication endpoint
///
/// Exchanges an email and password for a bearer token. The request is a
/// form, matching the OAuth2 password flow field names.
///
/// # Endpoints
///
/// - `POST /token` - Login and get an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use ecom_shared::{auth::password, store::UserStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email address
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed access token
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=user@example.com&password=secret123
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Form missing a field
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(form) = form?;

    let user = state
        .store
        .find_user_by_email(&form.username)
        .await?
        .ok_or_else(|| {
            warn!(email = %form.username, "Login failed: unknown email");
            invalid_credentials()
        })?;

    // Argon2 is CPU-bound, keep it off the async workers
    let hash = user.password_hash.clone();
    let candidate = form.password;
    let verified =
        tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash)).await?;

    if !verified {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(invalid_credentials());
    }

    let access_token = state.tokens.issue(user.id)?;

    info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Incorrect email or password".to_string())
}
