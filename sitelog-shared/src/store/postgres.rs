//! Postgres adapter for the store ports

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{HealthProbe, ProjectStore, StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};
use crate::models::task::{NewTask, ReviewUpdate, Task, TaskKind};
use crate::models::user::{CreateUser, User, UserSummary};

/// Store backed by a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn user_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<UserSummary>> {
        Ok(User::summaries(&self.pool, ids).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(Project::list(&self.pool).await?)
    }

    async fn projects_for_engineer(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_for_engineer(&self.pool, user_id).await?)
    }

    async fn projects_for_supervisor(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_for_supervisor(&self.pool, user_id).await?)
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, data).await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }

    async fn project_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<ProjectSummary>> {
        Ok(Project::summaries(&self.pool, ids).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, data: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, kind: TaskKind, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, kind, id).await?)
    }

    async fn tasks_for_project(&self, kind: TaskKind, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, kind, project_id).await?)
    }

    async fn all_tasks(&self, kind: TaskKind) -> StoreResult<Vec<Task>> {
        Ok(Task::list_all(&self.pool, kind).await?)
    }

    async fn apply_review(
        &self,
        kind: TaskKind,
        id: Uuid,
        review: ReviewUpdate,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::apply_review(&self.pool, kind, id, review).await?)
    }

    async fn delete_task(&self, kind: TaskKind, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, kind, id).await?)
    }
}

#[async_trait]
impl HealthProbe for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
