//! Task lifecycle engine
//!
//! Owns every rule about who may create, read, delete and review a task.
//! Each operation first checks the caller's role against the operation's
//! role set, then the project membership or task ownership it needs, and
//! only then touches the task store.
//!
//! Status moves freely between pending, done and failed; the latest review
//! wins and always records who reviewed and when.
//!
//! # Example
//!
//! ```no_run
//! use sitelog_shared::auth::principal::Principal;
//! use sitelog_shared::lifecycle::{CreateTaskInput, TaskLifecycle};
//! use sitelog_shared::models::task::TaskKind;
//! use sitelog_shared::store::Stores;
//! use uuid::Uuid;
//!
//! # async fn example(project_id: Uuid, engineer: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let lifecycle = TaskLifecycle::new(Stores::in_memory());
//! let view = lifecycle
//!     .create_task(
//!         &Principal::engineer(engineer),
//!         TaskKind::Daily,
//!         CreateTaskInput {
//!             project_id,
//!             title: "Pour foundation".to_string(),
//!             note: None,
//!             date: None,
//!         },
//!     )
//!     .await?;
//! println!("created {}", view.task.id);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::{
    require_project_engineer, require_project_reader, require_project_supervisor,
    require_task_owner, AuthzError, Operation,
};
use crate::auth::principal::{Principal, Role};
use crate::error::{check_max_len, store_err, ServiceError, ServiceResult};
use crate::models::project::{Project, ProjectView};
use crate::models::task::{NewTask, ReviewUpdate, Task, TaskKind, TaskStatus, TaskView};
use crate::store::populate::{project_views, task_view, task_views, ProjectJoin};
use crate::store::Stores;

/// Caller-supplied fields for a new task
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    pub project_id: Uuid,
    pub title: String,
    pub note: Option<String>,
    /// Required for monthly tasks; daily tasks default to now
    pub date: Option<DateTime<Utc>>,
}

/// A supervisor's review; omitted fields stay as they are
#[derive(Debug, Clone, Default)]
pub struct ReviewInput {
    pub status: Option<TaskStatus>,
    /// Blank notes count as omitted
    pub supervisor_note: Option<String>,
}

/// Drops blank optional text
fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Task creation, listing, deletion and review
#[derive(Clone)]
pub struct TaskLifecycle {
    stores: Stores,
}

impl TaskLifecycle {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    async fn load_project(&self, caller: &Principal, id: Uuid) -> ServiceResult<Option<Project>> {
        self.stores
            .projects
            .find_project(id)
            .await
            .map_err(store_err("find_project", caller, Some(id)))
    }

    /// Creates a pending task in a project the caller is an engineer on
    ///
    /// Checks, in order: project exists, caller is one of its engineers,
    /// title is not blank and fits its column, monthly tasks carry a date.
    pub async fn create_task(
        &self,
        caller: &Principal,
        kind: TaskKind,
        input: CreateTaskInput,
    ) -> ServiceResult<TaskView> {
        Operation::CreateTask.authorize(caller)?;

        let project = self
            .load_project(caller, input.project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        require_project_engineer(&project, caller)?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("title is required".to_string()));
        }
        check_max_len("title", title, Task::TITLE_MAX_LEN)?;

        let date = match (input.date, kind.requires_date()) {
            (Some(date), _) => date,
            (None, true) => {
                return Err(ServiceError::Validation(format!(
                    "date is required for {} tasks",
                    kind
                )))
            }
            (None, false) => Utc::now(),
        };

        // Role check above guarantees a user principal
        let created_by = caller
            .user_id()
            .ok_or(AuthzError::RoleNotPermitted { role: Role::Admin })?;

        let task = self
            .stores
            .tasks
            .insert_task(NewTask {
                kind,
                project_id: project.id,
                created_by,
                title: title.to_string(),
                note: non_blank(input.note),
                date,
            })
            .await
            .map_err(store_err("create_task", caller, Some(project.id)))?;

        info!(
            task_id = %task.id,
            project_id = %project.id,
            user_id = %created_by,
            kind = %kind,
            "Task created"
        );

        task_view(&self.stores, task)
            .await
            .map_err(store_err("create_task", caller, Some(project.id)))
    }

    /// Tasks of one kind in a project, newest first
    ///
    /// Engineers must be on the engineer list and supervisors on the
    /// supervisor list; a project that does not exist fails the same way.
    /// The administrator sees any project, including unknown ones (empty).
    pub async fn list_tasks_for_project(
        &self,
        caller: &Principal,
        kind: TaskKind,
        project_id: Uuid,
    ) -> ServiceResult<Vec<TaskView>> {
        Operation::ListTasksForProject.authorize(caller)?;

        if !matches!(caller, Principal::Admin) {
            let project = self
                .load_project(caller, project_id)
                .await?
                .ok_or(AuthzError::ProjectUnavailable(project_id))?;
            require_project_reader(&project, caller)?;
        }

        let tasks = self
            .stores
            .tasks
            .tasks_for_project(kind, project_id)
            .await
            .map_err(store_err("list_tasks_for_project", caller, Some(project_id)))?;

        debug!(project_id = %project_id, kind = %kind, count = tasks.len(), "Listed tasks");

        task_views(&self.stores, tasks, ProjectJoin::Skip)
            .await
            .map_err(store_err("list_tasks_for_project", caller, Some(project_id)))
    }

    /// Reads one task
    ///
    /// Visible to its creator, the project's engineers and supervisors, and
    /// the administrator.
    pub async fn get_task(
        &self,
        caller: &Principal,
        kind: TaskKind,
        task_id: Uuid,
    ) -> ServiceResult<TaskView> {
        Operation::GetTask.authorize(caller)?;

        let task = self
            .stores
            .tasks
            .find_task(kind, task_id)
            .await
            .map_err(store_err("get_task", caller, Some(task_id)))?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        let is_owner = require_task_owner(&task, caller).is_ok();
        if !is_owner && !matches!(caller, Principal::Admin) {
            let project = self
                .load_project(caller, task.project_id)
                .await?
                .ok_or(AuthzError::ProjectUnavailable(task.project_id))?;
            require_project_reader(&project, caller)?;
        }

        task_view(&self.stores, task)
            .await
            .map_err(store_err("get_task", caller, Some(task_id)))
    }

    /// Permanently removes a task the caller created
    pub async fn delete_task(
        &self,
        caller: &Principal,
        kind: TaskKind,
        task_id: Uuid,
    ) -> ServiceResult<()> {
        Operation::DeleteTask.authorize(caller)?;

        let task = self
            .stores
            .tasks
            .find_task(kind, task_id)
            .await
            .map_err(store_err("delete_task", caller, Some(task_id)))?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        require_task_owner(&task, caller)?;

        let deleted = self
            .stores
            .tasks
            .delete_task(kind, task_id)
            .await
            .map_err(store_err("delete_task", caller, Some(task_id)))?;

        // Lost a race with another delete
        if !deleted {
            return Err(ServiceError::NotFound("Task not found".to_string()));
        }

        info!(task_id = %task_id, project_id = %task.project_id, kind = %kind, "Task deleted");
        Ok(())
    }

    /// Records a supervisor review
    ///
    /// Status and note are applied only when provided. Reviewer and review
    /// time are always overwritten.
    pub async fn review_task(
        &self,
        caller: &Principal,
        kind: TaskKind,
        task_id: Uuid,
        input: ReviewInput,
    ) -> ServiceResult<TaskView> {
        Operation::ReviewTask.authorize(caller)?;

        let task = self
            .stores
            .tasks
            .find_task(kind, task_id)
            .await
            .map_err(store_err("review_task", caller, Some(task_id)))?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        let project = self
            .load_project(caller, task.project_id)
            .await?
            .ok_or(AuthzError::ProjectUnavailable(task.project_id))?;

        require_project_supervisor(&project, caller)?;

        let reviewed_by = caller
            .user_id()
            .ok_or(AuthzError::RoleNotPermitted { role: Role::Admin })?;

        let review = ReviewUpdate {
            status: input.status,
            supervisor_note: non_blank(input.supervisor_note),
            reviewed_by,
            reviewed_at: Utc::now(),
        };

        let updated = self
            .stores
            .tasks
            .apply_review(kind, task_id, review)
            .await
            .map_err(store_err("review_task", caller, Some(task_id)))?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        info!(
            task_id = %task_id,
            project_id = %updated.project_id,
            user_id = %reviewed_by,
            status = %updated.status,
            "Task reviewed"
        );

        task_view(&self.stores, updated)
            .await
            .map_err(store_err("review_task", caller, Some(task_id)))
    }

    /// Projects the caller belongs to: as engineer for engineers, as
    /// supervisor for supervisors
    pub async fn projects_for_caller(&self, caller: &Principal) -> ServiceResult<Vec<ProjectView>> {
        let projects = match caller {
            Principal::User { id, .. } if caller.role() == Role::Engineer => {
                Operation::ListEngineerProjects.authorize(caller)?;
                self.stores.projects.projects_for_engineer(*id).await
            }
            Principal::User { id, .. } => {
                Operation::ListSupervisedProjects.authorize(caller)?;
                self.stores.projects.projects_for_supervisor(*id).await
            }
            Principal::Admin => {
                return Err(AuthzError::RoleNotPermitted { role: Role::Admin }.into());
            }
        }
        .map_err(store_err("projects_for_caller", caller, caller.user_id()))?;

        project_views(&self.stores, projects)
            .await
            .map_err(store_err("projects_for_caller", caller, caller.user_id()))
    }
}
