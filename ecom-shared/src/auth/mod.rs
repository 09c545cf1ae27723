/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing with 72-byte truncation
/// - [`jwt`]: HS256 bearer tokens with a fixed lifetime
/// - [`authorization`]: token-to-user resolution and role checks
/// - [`middleware`]: `Authorization` header parsing and the `AuthContext` extractor
///
/// # Example
///
/// ```
/// use ecom_shared::auth::jwt::TokenService;
/// use ecom_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash));
///
/// let tokens = TokenService::new("test-secret-key-at-least-32-bytes-long");
/// let token = tokens.issue(1)?;
/// assert_eq!(tokens.validate(&token)?, 1);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
