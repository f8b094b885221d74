//! Login and logout
//!
//! Each route family has its own login endpoint. Engineer and supervisor
//! logins check the password first (401 on failure) and then that the
//! account belongs to the family (403 otherwise). The admin login compares
//! against the configured credential pair.
//!
//! Tokens are stateless, so logout only acknowledges; clients discard the
//! token.
//!
//! ```text
//! POST /api/{admin|engineer|supervisor}/login
//! Content-Type: application/json
//!
//! { "email": "e1@example.com", "password": "..." }
//! ```
//!
//! ```json
//! {
//!   "message": "Engineer login successful",
//!   "token": "eyJ...",
//!   "user": { "id": "uuid", "name": "E1", "email": "e1@example.com", "role": "engineer" }
//! }
//! ```

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use sitelog_shared::auth::identity::Session;
use sitelog_shared::models::user::{UserRole, UserSummary};
use validator::Validate;

use crate::{app::AppState, error::ApiResult};

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    /// Absent for the administrator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

fn login_response(label: &str, session: Session) -> Json<LoginResponse> {
    Json(LoginResponse {
        message: format!("{} login successful", label),
        token: session.token,
        user: session.user,
    })
}

async fn user_login(
    state: &AppState,
    payload: Result<Json<LoginRequest>, JsonRejection>,
    role: UserRole,
    label: &str,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let session = state
        .identity
        .login_user(req.email.trim(), &req.password, role)
        .await?;

    Ok(login_response(label, session))
}

pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let session = state.identity.login_admin(req.email.trim(), &req.password)?;
    Ok(login_response("Admin", session))
}

pub async fn engineer_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    user_login(&state, payload, UserRole::Engineer, "Engineer").await
}

pub async fn supervisor_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    user_login(&state, payload, UserRole::Supervisor, "Supervisor").await
}

pub async fn logout() -> Json<MessageResponse> {
    MessageResponse::new("Logout successful")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "e1@sitelog.test".to_string(),
            password: "secret".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "nope".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_admin_response_omits_user() {
        let body = serde_json::to_value(LoginResponse {
            message: "Admin login successful".to_string(),
            token: "t".to_string(),
            user: None,
        })
        .unwrap();
        assert!(body.get("user").is_none());
    }
}
