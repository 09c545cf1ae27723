/// Token service: signed, time-limited bearer tokens
///
/// Tokens are JWTs signed with HS256 using a process-wide secret. The payload
/// carries the user ID and an expiration timestamp.
///
/// # Validation
///
/// A token is accepted only if the signature matches, the structure decodes
/// and `exp` is still in the future (no leeway). Every failure is reported
/// as the same [`TokenError::Invalid`] so callers can't tell a forged token
/// from an expired one.
///
/// # Example
///
/// ```
/// use ecom_shared::auth::jwt::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("test-secret-key-at-least-32-bytes-long");
///
/// let token = tokens.issue(42)?;
/// assert_eq!(tokens.validate(&token)?, 42);
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifetime of an issued token unless configured otherwise
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Subject claim of every access token
const TOKEN_SUBJECT: &str = "access";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, structure or expiry check failed
    #[error("Invalid token")]
    Invalid,
}

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    pub user_id: i64,

    /// Always `"access"`
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` expiring `ttl` from now
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            sub: TOKEN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Issues and validates access tokens with one signing secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Service with the default 30 minute lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    /// Service with a custom token lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Lifetime given to new tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `user_id`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if encoding fails
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Returns the user ID carried by a valid token
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` on a bad signature, a malformed token or
    /// an expired token
    pub fn validate(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.sub = Some(TOKEN_SUBJECT.to_string());
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.user_id)
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Rejected bearer token");
                TokenError::Invalid
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_validate() {
        let tokens = TokenService::new(SECRET);

        let token = tokens.issue(7).expect("Should create token");
        assert_eq!(tokens.validate(&token).expect("Should validate"), 7);
    }

    #[test]
    fn test_default_ttl_is_thirty_minutes() {
        let tokens = TokenService::new(SECRET);
        assert_eq!(tokens.ttl(), Duration::minutes(30));

        let claims = Claims::new(1, tokens.ttl());
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert_eq!(claims.sub, "access");
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = TokenService::new(SECRET).issue(1).unwrap();

        let other = TokenService::new("another-secret-key-at-least-32-bytes");
        assert!(matches!(other.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let tokens = TokenService::with_ttl(SECRET, Duration::seconds(-60));
        let token = tokens.issue(1).unwrap();

        assert!(matches!(tokens.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let tokens = TokenService::new(SECRET);

        for token in ["", "not-a-jwt", "a.b.c"] {
            assert!(matches!(tokens.validate(token), Err(TokenError::Invalid)));
        }
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue(1).unwrap();
        let forged = tokens.issue(2).unwrap();

        // Header and payload of one token with the signature of another
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];

        assert!(matches!(tokens.validate(&parts.join(".")), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", TokenService::new(SECRET));
        assert!(!debug.contains(SECRET));
    }
}
