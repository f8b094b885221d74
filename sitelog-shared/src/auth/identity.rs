//! Identity provider
//!
//! Verifies credentials and issues or validates the signed assertions that
//! carry a [`Principal`] between requests. Engineers and supervisors are
//! checked against the user store; the administrator against a configured
//! credential pair.
//!
//! All secrets arrive through [`IdentityConfig`] at construction time.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use super::jwt::{create_token, validate_token, Claims, JwtError};
use super::password::{verify_password, PasswordError};
use super::principal::Principal;
use crate::models::user::{User, UserRole, UserSummary};
use crate::store::{StoreError, UserStore};

/// Secrets and lifetimes for the identity provider
#[derive(Clone)]
pub struct IdentityConfig {
    pub admin_email: String,
    pub admin_password: String,
    /// HS256 signing secret
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Error type for identity operations
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credentials are valid but belong to a different role
    #[error("Access denied: account is a {actual}, not a {expected}")]
    RoleMismatch { expected: UserRole, actual: UserRole },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    /// Absent for the administrator
    pub user: Option<UserSummary>,
}

/// Credential verification and assertion handling
pub struct IdentityProvider {
    config: IdentityConfig,
    users: Arc<dyn UserStore>,
}

impl IdentityProvider {
    pub fn new(config: IdentityConfig, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }

    /// Looks up a user by email and checks the password
    ///
    /// Returns `Ok(None)` for an unknown email or a wrong password.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, IdentityError> {
        let Some(user) = self.users.find_user_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Logs in an engineer or supervisor through the entry point for
    /// `expected`
    ///
    /// Credentials are checked before the role, so a wrong password is
    /// always `InvalidCredentials` regardless of the account's role.
    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
        expected: UserRole,
    ) -> Result<Session, IdentityError> {
        let Some(user) = self.verify_credentials(email, password).await? else {
            warn!(role = %expected, "Login refused: invalid credentials");
            return Err(IdentityError::InvalidCredentials);
        };

        if user.role != expected {
            warn!(
                user_id = %user.id,
                expected = %expected,
                actual = %user.role,
                "Login refused: role mismatch"
            );
            return Err(IdentityError::RoleMismatch {
                expected,
                actual: user.role,
            });
        }

        let principal = Principal::User {
            id: user.id,
            role: user.role,
        };
        let token = self.issue_assertion(&principal)?;

        info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(Session {
            token,
            principal,
            user: Some(UserSummary::from(&user)),
        })
    }

    /// Logs in the administrator against the configured credential pair
    pub fn login_admin(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        // Evaluate both comparisons so timing does not reveal which one failed
        let email_ok = constant_time_compare(email, &self.config.admin_email);
        let password_ok = constant_time_compare(password, &self.config.admin_password);

        if !(email_ok & password_ok) {
            warn!("Admin login refused: invalid credentials");
            return Err(IdentityError::InvalidCredentials);
        }

        let token = self.issue_assertion(&Principal::Admin)?;
        info!("Admin logged in");

        Ok(Session {
            token,
            principal: Principal::Admin,
            user: None,
        })
    }

    /// Signs an assertion for the caller
    pub fn issue_assertion(&self, principal: &Principal) -> Result<String, IdentityError> {
        let claims = Claims::for_principal(principal, self.config.token_ttl);
        Ok(create_token(&claims, &self.config.jwt_secret)?)
    }

    /// Validates a token and recovers its principal
    pub fn validate_assertion(&self, token: &str) -> Result<Principal, JwtError> {
        validate_token(token, &self.config.jwt_secret)?.principal()
    }
}

/// Compares two strings without short-circuiting on the first difference
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
