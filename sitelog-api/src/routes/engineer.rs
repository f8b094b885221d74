//! Engineer endpoints
//!
//! - `GET    /api/engineer/projects`
//! - `POST   /api/engineer/daily-tasks`
//! - `GET    /api/engineer/daily-tasks/:id` (project id)
//! - `DELETE /api/engineer/daily-tasks/:id` (task id)
//!
//! and the same three task routes under `/monthly-tasks`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};
use sitelog_shared::auth::principal::Principal;
use sitelog_shared::lifecycle::CreateTaskInput;
use sitelog_shared::models::project::ProjectView;
use sitelog_shared::models::task::{TaskKind, TaskView};
use uuid::Uuid;

use super::session::MessageResponse;
use crate::{app::AppState, error::ApiResult};

/// New task request
///
/// Title and date rules are enforced by the lifecycle engine after the
/// project and membership checks.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(alias = "projectId")]
    pub project_id: Uuid,

    #[serde(default)]
    pub title: String,

    pub note: Option<String>,

    /// Required for monthly tasks; RFC 3339 or a plain `YYYY-MM-DD`
    #[serde(default, deserialize_with = "deserialize_task_date")]
    pub date: Option<DateTime<Utc>>,
}

/// Parses an RFC 3339 timestamp, or a calendar day as midnight UTC
fn parse_task_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

fn deserialize_task_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_task_date(raw.trim()).ok_or_else(|| {
                de::Error::custom(format!(
                    "invalid date `{}`, expected YYYY-MM-DD or an RFC 3339 timestamp",
                    raw
                ))
            })
        })
        .transpose()
}

pub async fn projects(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    Ok(Json(state.lifecycle.projects_for_caller(&caller).await?))
}

async fn create_task(
    state: &AppState,
    caller: &Principal,
    kind: TaskKind,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let Json(req) = payload?;

    let view = state
        .lifecycle
        .create_task(
            caller,
            kind,
            CreateTaskInput {
                project_id: req.project_id,
                title: req.title,
                note: req.note,
                date: req.date,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn create_daily_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    create_task(&state, &caller, TaskKind::Daily, payload).await
}

pub async fn create_monthly_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    create_task(&state, &caller, TaskKind::Monthly, payload).await
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

pub async fn delete_daily_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .lifecycle
        .delete_task(&caller, TaskKind::Daily, task_id)
        .await?;
    Ok(MessageResponse::new("Daily task deleted successfully"))
}

pub async fn delete_monthly_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .lifecycle
        .delete_task(&caller, TaskKind::Monthly, task_id)
        .await?;
    Ok(MessageResponse::new("Monthly task deleted successfully"))
}
