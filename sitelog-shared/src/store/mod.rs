//! Persistence ports
//!
//! The lifecycle engine and the oversight layer talk to storage only
//! through these traits. Two adapters implement all of them:
//!
//! - [`postgres::PgStore`]: sqlx over a `PgPool`, delegating to the model
//!   queries
//! - [`memory::InMemoryStore`]: a lock-guarded map set for tests and local
//!   runs without a database
//!
//! Lookups return `Ok(None)` or an empty `Vec` for missing data; an `Err`
//! always means the store itself failed or a uniqueness rule was hit.

pub mod memory;
pub mod populate;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};
use crate::models::task::{NewTask, ReviewUpdate, Task, TaskKind};
use crate::models::user::{CreateUser, User, UserSummary};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store adapters
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// Persistence-layer failure
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::persistence(err)
    }
}

/// User accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the email is taken.
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// All users, newest first
    async fn list_users(&self) -> StoreResult<Vec<UserSummary>>;

    /// Summaries for the given ids, in no particular order. Unknown ids are
    /// skipped.
    async fn user_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<UserSummary>>;

    /// Returns false if the user did not exist
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

/// Projects and their membership lists
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// All projects, newest first
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    async fn projects_for_engineer(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    async fn projects_for_supervisor(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    /// Returns `None` if the project does not exist
    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>>;

    /// Returns false if the project did not exist
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    async fn project_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<ProjectSummary>>;
}

/// Daily and monthly tasks
///
/// Every lookup is scoped by kind; a daily task is invisible to monthly
/// operations and the other way round.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, data: NewTask) -> StoreResult<Task>;

    async fn find_task(&self, kind: TaskKind, id: Uuid) -> StoreResult<Option<Task>>;

    /// Tasks of one project, newest first per [`TaskKind::listing_order`]
    async fn tasks_for_project(&self, kind: TaskKind, project_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn all_tasks(&self, kind: TaskKind) -> StoreResult<Vec<Task>>;

    /// Writes a review. Returns `None` if the task is gone.
    async fn apply_review(
        &self,
        kind: TaskKind,
        id: Uuid,
        review: ReviewUpdate,
    ) -> StoreResult<Option<Task>>;

    /// Returns false if the task did not exist
    async fn delete_task(&self, kind: TaskKind, id: Uuid) -> StoreResult<bool>;
}

/// Liveness check for the health endpoint
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

/// The set of stores handed to the engine and the oversight layer
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub probe: Arc<dyn HealthProbe>,
}

impl Stores {
    /// Wires every port to one adapter instance
    pub fn from_adapter<S>(adapter: Arc<S>) -> Self
    where
        S: UserStore + ProjectStore + TaskStore + HealthProbe + 'static,
    {
        Self {
            users: adapter.clone(),
            projects: adapter.clone(),
            tasks: adapter.clone(),
            probe: adapter,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_adapter(Arc::new(PgStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_adapter(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_display() {
        let err = StoreError::persistence(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "persistence error: disk full");
    }

    #[test]
    fn test_conflict_error_display() {
        let err = StoreError::Conflict("users_email_key".to_string());
        assert!(err.to_string().contains("users_email_key"));
    }

    #[test]
    fn test_non_database_sqlx_error_is_persistence() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Persistence(_)));
    }
}
