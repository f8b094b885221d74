//! JWT assertions
//!
//! Tokens are HS256-signed and carry the caller's role plus, for engineers
//! and supervisors, their user id. Administrator tokens have no subject.
//!
//! # Example
//!
//! ```
//! use sitelog_shared::auth::jwt::{create_token, validate_token, Claims};
//! use sitelog_shared::auth::principal::Principal;
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let principal = Principal::engineer(Uuid::new_v4());
//! let claims = Claims::for_principal(&principal, Duration::hours(24));
//! let token = create_token(&claims, "a-secret-that-is-at-least-32-bytes")?;
//!
//! let validated = validate_token(&token, "a-secret-that-is-at-least-32-bytes")?;
//! assert_eq!(validated.principal()?, principal);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::{Principal, Role};
use crate::models::user::UserRole;

/// Issuer claim written into and required on every token
pub const ISSUER: &str = "sitelog";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    /// Signature checked out but the claims do not describe a valid caller
    #[error("Invalid token claims: {0}")]
    InvalidClaims(String),

    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Token claims
///
/// Standard claims `iss`, `iat`, `exp`, `nbf` plus `role`. `sub` holds the
/// user id and is absent for the administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Uuid>,

    pub role: Role,

    pub iss: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,
}

impl Claims {
    /// Builds claims for a caller, valid from now for `expires_in`
    pub fn for_principal(principal: &Principal, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: principal.user_id(),
            role: principal.role(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Recovers the caller the token was issued to
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::InvalidClaims`] when an admin token names a
    /// subject or a user token lacks one.
    pub fn principal(&self) -> Result<Principal, JwtError> {
        match (self.role, self.sub) {
            (Role::Admin, None) => Ok(Principal::Admin),
            (Role::Admin, Some(_)) => Err(JwtError::InvalidClaims(
                "admin token must not carry a subject".to_string(),
            )),
            (Role::Engineer, Some(id)) => Ok(Principal::User {
                id,
                role: UserRole::Engineer,
            }),
            (Role::Supervisor, Some(id)) => Ok(Principal::User {
                id,
                role: UserRole::Supervisor,
            }),
            (role, None) => Err(JwtError::InvalidClaims(format!(
                "{} token is missing its subject",
                role
            ))),
        }
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature, expiry, not-before and issuer, returning the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
