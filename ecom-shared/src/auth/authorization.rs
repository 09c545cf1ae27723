/// Authorization guard
///
/// Turns a bearer token into a live user record and checks roles.
///
/// # Checks
///
/// 1. **Token**: signature and expiry via [`TokenService::validate`]
/// 2. **Identity**: the user named by the token must still exist. A valid
///    token for a deleted account is rejected like a forged one.
/// 3. **Role**: [`require_admin`] for catalogue and user management
/// 4. **Ownership**: [`require_owner_or_admin`] for per-user resources
///
/// # Example
///
/// ```
/// use ecom_shared::auth::authorization::{require_admin, resolve_user, AuthzError};
/// use ecom_shared::auth::jwt::TokenService;
/// use ecom_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("test-secret-key-at-least-32-bytes-long");
/// let store = MemoryStore::new();
///
/// // No such user
/// let token = tokens.issue(1)?;
/// let result = resolve_user(&tokens, &store, &token).await;
/// assert!(matches!(result, Err(AuthzError::Unauthenticated)));
/// # Ok(())
/// # }
/// ```

use tracing::debug;

use super::jwt::TokenService;
use crate::models::user::{User, UserRole};
use crate::store::{StoreError, UserStore};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Bad, expired or stale token
    #[error("Could not validate credentials")]
    Unauthenticated,

    /// Authenticated, but not allowed
    #[error("Operation forbidden: admin privileges required")]
    Forbidden,

    /// User lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves the current user from a bearer token
///
/// # Errors
///
/// - `AuthzError::Unauthenticated` if the token is invalid or its user no
///   longer exists
/// - `AuthzError::Store` if the lookup itself fails
pub async fn resolve_user<U>(tokens: &TokenService, users: &U, token: &str) -> Result<User, AuthzError>
where
    U: UserStore + ?Sized,
{
    let user_id = tokens
        .validate(token)
        .map_err(|_| AuthzError::Unauthenticated)?;

    match users.find_user(user_id).await? {
        Some(user) => Ok(user),
        None => {
            debug!(user_id, "Token refers to a user that no longer exists");
            Err(AuthzError::Unauthenticated)
        }
    }
}

/// Passes the user through if they are an administrator
///
/// # Errors
///
/// Returns `AuthzError::Forbidden` for any other role
pub fn require_admin(user: User) -> Result<User, AuthzError> {
    match user.role {
        UserRole::Admin => Ok(user),
        UserRole::User => Err(AuthzError::Forbidden),
    }
}

/// Allows the owner of a resource, or any administrator
///
/// # Errors
///
/// Returns `AuthzError::Forbidden` if `user` neither owns the resource nor
/// is an admin
pub fn require_owner_or_admin(user: &User, owner_id: i64) -> Result<(), AuthzError> {
    if user.id == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}
