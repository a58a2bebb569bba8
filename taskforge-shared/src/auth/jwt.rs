/// JWT token generation and validation module
///
/// This module provides the session tokens issued at login. Tokens are signed
/// with HS256 and carry the user id as their subject; role is deliberately
/// not a claim, the auth middleware reads it fresh from the database.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC-SHA256)
/// - **Expiration**: 24 hours from issuance
/// - **Validation**: signature, expiration, not-before, and issuer checks
/// - **Secret Management**: secrets must be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskforge_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token issuer claim value
const ISSUER: &str = "taskforge";

/// How long a session token stays valid after issuance
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is malformed, tampered with, or carries the wrong issuer
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims structure
///
/// Standard claims only:
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskforge")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: i64,

    /// Issuer - always "taskforge"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates new claims with the standard 24-hour expiration
    ///
    /// # Example
    ///
    /// ```
    /// use taskforge_shared::auth::jwt::Claims;
    ///
    /// let claims = Claims::new(42);
    /// assert_eq!(claims.sub, 42);
    /// assert!(!claims.is_expired());
    /// ```
    pub fn new(user_id: i64) -> Self {
        Self::with_expiration(user_id, Duration::hours(TOKEN_LIFETIME_HOURS))
    }

    /// Creates claims with a custom expiration
    ///
    /// A negative duration produces an already-expired token, which is how
    /// the expiry tests exercise the validation path.
    pub fn with_expiration(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration, None when already expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "taskforge"
/// - Token is not used before its nbf time
///
/// # Errors
///
/// Returns `JwtError::Expired` for a token past its validity window and
/// `JwtError::Invalid` for everything else (bad signature, garbage input,
/// wrong issuer).
///
/// # Example
///
/// ```
/// use taskforge_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(7), secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, 7);
/// assert_eq!(validated.iss, "taskforge");
/// # Ok(())
/// # }
/// ```
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
