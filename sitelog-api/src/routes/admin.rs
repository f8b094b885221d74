//! Administrator endpoints
//!
//! All routes here sit behind the admin route gate.
//!
//! - `GET    /api/admin/users`
//! - `POST   /api/admin/users`
//! - `DELETE /api/admin/users/:id`
//! - `GET    /api/admin/projects`
//! - `POST   /api/admin/projects`
//! - `GET    /api/admin/projects/:id`
//! - `PUT    /api/admin/projects/:id`
//! - `DELETE /api/admin/projects/:id`
//! - `GET    /api/admin/tasks/daily`
//! - `GET    /api/admin/tasks/monthly`
//! - `GET    /api/admin/tasks/project/:id`

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sitelog_shared::auth::principal::Principal;
use sitelog_shared::models::project::ProjectView;
use sitelog_shared::models::task::{TaskKind, TaskView};
use sitelog_shared::models::user::{UserRole, UserSummary};
use sitelog_shared::oversight::{
    CreateProjectInput, CreateUserInput, ProjectTasks, UpdateProjectInput,
};
use uuid::Uuid;
use validator::Validate;

use super::session::MessageResponse;
use crate::{app::AppState, error::ApiResult};

/// Create user request
///
/// Missing fields deserialize as empty and are reported by the domain
/// layer as validation errors.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    pub password: String,

    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "scopeOfWork")]
    pub scope_of_work: String,

    #[serde(default)]
    pub engineers: Vec<Uuid>,

    #[serde(default)]
    pub supervisors: Vec<Uuid>,
}

/// Partial update; omitted fields stay as they are
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,

    #[serde(alias = "scopeOfWork")]
    pub scope_of_work: Option<String>,

    pub engineers: Option<Vec<Uuid>>,
    pub supervisors: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub message: String,
    pub project: ProjectView,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.oversight.list_users(&caller).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserCreatedResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let user = state
        .oversight
        .create_user(
            &caller,
            CreateUserInput {
                name: req.name,
                email: req.email,
                password: req.password,
                role: req.role,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.oversight.delete_user(&caller, id).await?;
    Ok(MessageResponse::new("User deleted successfully"))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    Ok(Json(state.oversight.list_projects(&caller).await?))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectView>> {
    Ok(Json(state.oversight.get_project(&caller, id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let Json(req) = payload?;

    let project = state
        .oversight
        .create_project(
            &caller,
            CreateProjectInput {
                name: req.name,
                scope_of_work: req.scope_of_work,
                engineers: req.engineers,
                supervisors: req.supervisors,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            message: "Project created successfully".to_string(),
            project,
        }),
    ))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<ProjectResponse>> {
    let Json(req) = payload?;

    let project = state
        .oversight
        .update_project(
            &caller,
            id,
            UpdateProjectInput {
                name: req.name,
                scope_of_work: req.scope_of_work,
                engineers: req.engineers,
                supervisors: req.supervisors,
            },
        )
        .await?;

    Ok(Json(ProjectResponse {
        message: "Project updated successfully".to_string(),
        project,
    }))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.oversight.delete_project(&caller, id).await?;
    Ok(MessageResponse::new("Project deleted successfully"))
}

pub async fn daily_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(
        state.oversight.list_all_tasks(&caller, TaskKind::Daily).await?,
    ))
}

pub async fn monthly_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(
        state.oversight.list_all_tasks(&caller, TaskKind::Monthly).await?,
    ))
}

/// Both task kinds of one project; unknown projects give empty lists
pub async fn project_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectTasks>> {
    Ok(Json(state.oversight.project_tasks(&caller, id).await?))
}
