//! Task creation, review and deletion over HTTP

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_daily_task_lifecycle() {
    let app = TestApp::new().await;
    let e1 = app.engineer_token(&app.e1);
    let e2 = app.engineer_token(&app.e2);
    let s1 = app.supervisor_token(&app.s1);

    let (status, task) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "projectId": app.project_id, "title": "Pour foundation" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["kind"], "daily");
    assert!(task["reviewed_by"].is_null());
    assert_eq!(task["creator"]["id"], app.e1.id.to_string());
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e2),
            json!({ "project_id": app.project_id, "title": "Not mine" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = app
        .get(&format!("/api/supervisor/daily-tasks/{}", app.project_id), &s1)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, reviewed) = app
        .put(
            &format!("/api/supervisor/daily-tasks/{}/review", task_id),
            &s1,
            json!({ "status": "done", "supervisorNote": "verified on site" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["message"], "Daily task reviewed successfully");
    assert_eq!(reviewed["task"]["status"], "done");
    assert_eq!(reviewed["task"]["supervisor_note"], "verified on site");
    assert_eq!(reviewed["task"]["reviewed_by"], app.s1.id.to_string());
    assert_eq!(reviewed["task"]["reviewer"]["id"], app.s1.id.to_string());
    assert!(!reviewed["task"]["reviewed_at"].is_null());

    let (status, _) = app
        .delete(&format!("/api/engineer/daily-tasks/{}", task_id), &e2)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .delete(&format!("/api/engineer/daily-tasks/{}", task_id), &e1)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Daily task deleted successfully");

    let (status, body) = app
        .delete(&format!("/api/engineer/daily-tasks/{}", task_id), &e1)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_monthly_task_requires_date() {
    let app = TestApp::new().await;
    let e1 = app.engineer_token(&app.e1);

    let (status, body) = app
        .post(
            "/api/engineer/monthly-tasks",
            Some(&e1),
            json!({ "project_id": app.project_id, "title": "March report" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "date");

    let (status, task) = app
        .post(
            "/api/engineer/monthly-tasks",
            Some(&e1),
            json!({
                "project_id": app.project_id,
                "title": "March report",
                "date": "2025-03-31"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["kind"], "monthly");
    assert_eq!(task["date"], "2025-03-31T00:00:00Z");

    let (status, listed) = app
        .get(&format!("/api/engineer/monthly-tasks/{}", app.project_id), &e1)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Kinds do not mix
    let (status, daily) = app
        .get(&format!("/api/engineer/daily-tasks/{}", app.project_id), &e1)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(daily.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_task_error_order() {
    let app = TestApp::new().await;
    let e1 = app.engineer_token(&app.e1);

    let (status, _) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "project_id": Uuid::new_v4(), "title": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "project_id": app.project_id, "title": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "title");

    let (status, body) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "title": "No project" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "project_id");

    let (status, body) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "project_id": app.project_id, "title": "x".repeat(501) }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "title");
}

#[tokio::test]
async fn test_unreadable_bodies() {
    let app = TestApp::new().await;
    let e1 = app.engineer_token(&app.e1);
    let s1 = app.supervisor_token(&app.s1);

    let (status, body) = app
        .post(
            "/api/engineer/monthly-tasks",
            Some(&e1),
            json!({ "project_id": app.project_id, "title": "March report", "date": "end of March" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "date");

    let (_, task) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "project_id": app.project_id, "title": "Formwork" }),
        )
        .await;
    let (status, body) = app
        .put(
            &format!(
                "/api/supervisor/daily-tasks/{}/review",
                task["id"].as_str().unwrap()
            ),
            &s1,
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "status");

    // Not JSON at all
    let response = {
        use axum::body::Body;
        use axum::http::{header, Request};
        use tower::ServiceExt;

        app.app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/engineer/daily-tasks")
                    .header(header::AUTHORIZATION, format!("Bearer {}", e1))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap()
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_supervisor_scope() {
    let app = TestApp::new().await;
    let e1 = app.engineer_token(&app.e1);
    let s2 = app.supervisor_token(&app.s2);

    let (_, task) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "project_id": app.project_id, "title": "Rebar check" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .get(&format!("/api/supervisor/daily-tasks/{}", app.project_id), &s2)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(
            &format!("/api/supervisor/daily-tasks/{}/review", task_id),
            &s2,
            json!({ "status": "failed" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(
            &format!("/api/supervisor/monthly-tasks/{}/review", task_id),
            &app.supervisor_token(&app.s1),
            json!({ "status": "failed" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partial_review_keeps_note() {
    let app = TestApp::new().await;
    let e1 = app.engineer_token(&app.e1);
    let s1 = app.supervisor_token(&app.s1);

    let (_, task) = app
        .post(
            "/api/engineer/daily-tasks",
            Some(&e1),
            json!({ "project_id": app.project_id, "title": "Crane inspection" }),
        )
        .await;
    let uri = format!(
        "/api/supervisor/daily-tasks/{}/review",
        task["id"].as_str().unwrap()
    );

    let (status, _) = app
        .put(&uri, &s1, json!({ "status": "failed", "supervisor_note": "cable worn" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, reviewed) = app.put(&uri, &s1, json!({ "status": "done" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["task"]["status"], "done");
    assert_eq!(reviewed["task"]["supervisor_note"], "cable worn");

    let (status, reviewed) = app.put(&uri, &s1, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["task"]["status"], "done");
    assert_eq!(reviewed["task"]["reviewed_by"], app.s1.id.to_string());
}
