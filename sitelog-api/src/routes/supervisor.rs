//! Supervisor endpoints
//!
//! - `GET /api/supervisor/projects`
//! - `GET /api/supervisor/daily-tasks/:id` (project id)
//! - `PUT /api/supervisor/daily-tasks/:id/review` (task id)
//!
//! and the same two task routes under `/monthly-tasks`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sitelog_shared::auth::principal::Principal;
use sitelog_shared::lifecycle::ReviewInput;
use sitelog_shared::models::project::ProjectView;
use sitelog_shared::models::task::{TaskKind, TaskStatus, TaskView};
use uuid::Uuid;

use crate::{app::AppState, error::ApiResult};

/// Review request; both fields optional
#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub status: Option<TaskStatus>,

    #[serde(alias = "supervisorNote")]
    pub supervisor_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub task: TaskView,
}

pub async fn projects(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    Ok(Json(state.lifecycle.projects_for_caller(&caller).await?))
}

pub async fn daily_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(
        state
            .lifecycle
            .list_tasks_for_project(&caller, TaskKind::Daily, project_id)
            .await?,
    ))
}

pub async fn monthly_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(
        state
            .lifecycle
            .list_tasks_for_project(&caller, TaskKind::Monthly, project_id)
            .await?,
    ))
}

async fn review(
    state: &AppState,
    caller: &Principal,
    kind: TaskKind,
    task_id: Uuid,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Json<ReviewResponse>> {
    let Json(req) = payload?;

    let task = state
        .lifecycle
        .review_task(
            caller,
            kind,
            task_id,
            ReviewInput {
                status: req.status,
                supervisor_note: req.supervisor_note,
            },
        )
        .await?;

    let label = match kind {
        TaskKind::Daily => "Daily",
        TaskKind::Monthly => "Monthly",
    };

    Ok(Json(ReviewResponse {
        message: format!("{} task reviewed successfully", label),
        task,
    }))
}

pub async fn review_daily_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(task_id): Path<Uuid>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Json<ReviewResponse>> {
    review(&state, &caller, TaskKind::Daily, task_id, payload).await
}

pub async fn review_monthly_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(task_id): Path<Uuid>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Json<ReviewResponse>> {
    review(&state, &caller, TaskKind::Monthly, task_id, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_request_fields_optional() {
        let req: ReviewRequest = serde_json::from_str("{}").unwrap();
        assert!(req.status.is_none());
        assert!(req.supervisor_note.is_none());

        let req: ReviewRequest =
            serde_json::from_str(r#"{"status": "done", "supervisorNote": "ok"}"#).unwrap();
        assert_eq!(req.status, Some(TaskStatus::Done));
        assert_eq!(req.supervisor_note.as_deref(), Some("ok"));
    }
}
