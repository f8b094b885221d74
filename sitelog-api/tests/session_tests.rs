//! Login, token handling and route-family gating over HTTP

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, ADMIN_EMAIL, ADMIN_PASSWORD, USER_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_banner_and_health() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = TestApp::new().await;

    let response = {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        app.app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap()
    };

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_engineer_login_flow() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/engineer/login",
            None,
            json!({ "email": "e1@sitelog.test", "password": USER_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Engineer login successful");
    assert_eq!(body["user"]["id"], app.e1.id.to_string());
    assert_eq!(body["user"]["role"], "engineer");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap().to_string();
    let (status, projects) = app.get("/api/engineer/projects", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_checks_password_before_role() {
    let app = TestApp::new().await;

    // Supervisor account, wrong password, engineer entry point
    let (status, _) = app
        .post(
            "/api/engineer/login",
            None,
            json!({ "email": "s1@sitelog.test", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Right password, wrong entry point
    let (status, body) = app
        .post(
            "/api/engineer/login",
            None,
            json!({ "email": "s1@sitelog.test", "password": USER_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app
        .post(
            "/api/supervisor/login",
            None,
            json!({ "email": "nobody@sitelog.test", "password": USER_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_validation() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/supervisor/login", None, json!({ "email": "not-an-email" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_login() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/admin/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("user").is_none());

    let token = body["token"].as_str().unwrap().to_string();
    let (status, users) = app.get("/api/admin/users", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 4);

    let (status, _) = app
        .post(
            "/api/admin/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": "guess" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_is_public() {
    let app = TestApp::new().await;

    for family in ["admin", "engineer", "supervisor"] {
        let (status, body) = app
            .send(Method::POST, &format!("/api/{}/logout", family), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logout successful");
    }
}

#[tokio::test]
async fn test_missing_and_malformed_credentials() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::GET, "/api/engineer/projects", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.get("/api/engineer/projects", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_route_families_are_role_gated() {
    let app = TestApp::new().await;
    let engineer = app.engineer_token(&app.e1);
    let supervisor = app.supervisor_token(&app.s1);
    let admin = app.admin_token();

    let (status, _) = app.get("/api/admin/users", &engineer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/engineer/projects", &supervisor).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/supervisor/projects", &admin).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/supervisor/projects", &supervisor).await;
    assert_eq!(status, StatusCode::OK);
}
