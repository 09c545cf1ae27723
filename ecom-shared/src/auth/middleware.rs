/// Bearer credentials for Axum
///
/// The API's auth layer reads the `Authorization` header with
/// [`bearer_token`], resolves the user and stores an [`AuthContext`] in the
/// request extensions. Handlers then take `AuthContext` as an extractor.
///
/// # Example
///
/// ```
/// use ecom_shared::auth::middleware::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.user.first_name)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::user::User;

/// Problems with the `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    /// No usable `Authorization` header
    #[error("Missing authorization header")]
    Missing,

    /// Header present but not `Bearer <token>`
    #[error("Expected Bearer token")]
    NotBearer,
}

/// Extracts the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively, so `bearer <token>` works too.
///
/// # Errors
///
/// - `BearerError::Missing` if the header is absent or not valid ASCII
/// - `BearerError::NotBearer` for any other scheme or an empty token
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(BearerError::Missing)?;

    let (scheme, token) = value.trim().split_once(' ').ok_or(BearerError::NotBearer)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(BearerError::NotBearer);
    }

    Ok(token)
}

/// Authenticated caller, inserted into request extensions by the auth layer
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User resolved from the bearer token
    pub user: User,
}

impl AuthContext {
    /// ID of the authenticated user
    pub fn user_id(&self) -> i64 {
        self.user.id
    }
}

/// Rejection when no auth layer ran in front of a handler taking `AuthContext`
///
/// Renders the same JSON shape as the API's other 401 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingAuthContext;

#[derive(Serialize)]
struct RejectionBody {
    error: &'static str,
    message: &'static str,
}

impl IntoResponse for MissingAuthContext {
    fn into_response(self) -> Response {
        let body = RejectionBody {
            error: "unauthorized",
            message: "Missing credentials",
        };

        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = MissingAuthContext;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(MissingAuthContext)
    }
}
