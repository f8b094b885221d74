//! Authentication middleware for Axum
//!
//! [`jwt_auth_middleware`] turns an `Authorization: Bearer <token>` header
//! into a [`Principal`] request extension. [`route_class_gate`] then checks
//! that principal's role against the route family being called.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{middleware, routing::get, Extension, Router};
//! use sitelog_shared::auth::identity::IdentityProvider;
//! use sitelog_shared::auth::middleware::{jwt_auth_middleware, route_class_gate, RouteClass};
//! use sitelog_shared::auth::principal::Principal;
//!
//! async fn whoami(Extension(principal): Extension<Principal>) -> String {
//!     principal.to_string()
//! }
//!
//! fn routes(identity: Arc<IdentityProvider>) -> Router {
//!     Router::new()
//!         .route("/whoami", get(whoami))
//!         .route_layer(middleware::from_fn_with_state(RouteClass::Engineer, route_class_gate))
//!         .route_layer(middleware::from_fn_with_state(identity, jwt_auth_middleware))
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use super::authorization::authorize;
use super::identity::IdentityProvider;
use super::jwt::JwtError;
use super::principal::{Principal, Role};

/// Route families, each restricted to one role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Admin,
    Engineer,
    Supervisor,
}

impl RouteClass {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            RouteClass::Admin => &[Role::Admin],
            RouteClass::Engineer => &[Role::Engineer],
            RouteClass::Supervisor => &[Role::Supervisor],
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Bad signature, expired, wrong issuer or malformed claims
    InvalidToken(String),

    /// Authenticated, but the role may not use this route family
    Forbidden(String),
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing credentials".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();
        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Validates the bearer token and stores the caller as a [`Principal`]
pub async fn jwt_auth_middleware(
    State(identity): State<Arc<IdentityProvider>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let principal = identity.validate_assertion(token).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    debug!(caller = %principal, "Authenticated request");
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Refuses callers whose role does not belong to the route family
///
/// Must run after [`jwt_auth_middleware`].
pub async fn route_class_gate(
    State(class): State<RouteClass>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .copied()
        .ok_or(AuthError::MissingCredentials)?;

    authorize(principal.role(), class.allowed_roles())
        .map_err(|e| AuthError::Forbidden(e.to_string()))?;

    Ok(next.run(req).await)
}
