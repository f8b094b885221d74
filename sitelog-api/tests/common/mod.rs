//! Shared harness for the HTTP integration tests
//!
//! Runs the real router over in-memory stores, so no database is needed.
//! Seeds two engineers, two supervisors and one project with E1 and S1 as
//! members.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sitelog_api::app::{build_router, AppState};
use sitelog_api::config::{ApiConfig, AuthConfig, Config};
use sitelog_shared::auth::principal::Principal;
use sitelog_shared::db::pool::DatabaseConfig;
use sitelog_shared::models::user::{UserRole, UserSummary};
use sitelog_shared::oversight::{CreateProjectInput, CreateUserInput};
use sitelog_shared::store::Stores;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@sitelog.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const USER_PASSWORD: &str = "site-password";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub project_id: Uuid,
    pub e1: UserSummary,
    pub e2: UserSummary,
    pub s1: UserSummary,
    pub s2: UserSummary,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused/test".to_string(),
            ..Default::default()
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-at-least-32-bytes".to_string(),
            jwt_ttl_hours: 1,
            admin_email: ADMIN_EMAIL.to_string(),
            admin_password: ADMIN_PASSWORD.to_string(),
        },
        validate_project_members: false,
        run_migrations: false,
    }
}

async fn seed_user(state: &AppState, name: &str, role: UserRole) -> UserSummary {
    state
        .oversight
        .create_user(
            &Principal::Admin,
            CreateUserInput {
                name: name.to_string(),
                email: format!("{}@sitelog.test", name.to_lowercase()),
                password: USER_PASSWORD.to_string(),
                role: Some(role),
            },
        )
        .await
        .expect("seed user")
}

impl TestApp {
    pub async fn new() -> Self {
        let state = AppState::new(Stores::in_memory(), test_config());

        let e1 = seed_user(&state, "E1", UserRole::Engineer).await;
        let e2 = seed_user(&state, "E2", UserRole::Engineer).await;
        let s1 = seed_user(&state, "S1", UserRole::Supervisor).await;
        let s2 = seed_user(&state, "S2", UserRole::Supervisor).await;

        let project = state
            .oversight
            .create_project(
                &Principal::Admin,
                CreateProjectInput {
                    name: "Riverside Bridge".to_string(),
                    scope_of_work: "Deck and pier works".to_string(),
                    engineers: vec![e1.id],
                    supervisors: vec![s1.id],
                },
            )
            .await
            .expect("seed project");

        Self {
            app: build_router(state.clone()),
            state,
            project_id: project.id,
            e1,
            e2,
            s1,
            s2,
        }
    }

    /// Signs a token directly, skipping the login round trip
    pub fn token_for(&self, principal: Principal) -> String {
        self.state
            .identity
            .issue_assertion(&principal)
            .expect("issue token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(Principal::Admin)
    }

    pub fn engineer_token(&self, user: &UserSummary) -> String {
        self.token_for(Principal::engineer(user.id))
    }

    pub fn supervisor_token(&self, user: &UserSummary) -> String {
        self.token_for(Principal::supervisor(user.id))
    }

    /// Sends one request and returns the status with the JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}
