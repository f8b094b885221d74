//! Admin oversight layer
//!
//! Unrestricted views over every user, project and task, plus user and
//! project provisioning. Every operation requires the administrator role.
//!
//! Deletions do not cascade: removing a user leaves their id in project
//! member lists and on tasks, removing a project leaves its tasks behind.
//! Joined views resolve such dangling ids to `None`.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::Operation;
use crate::auth::password::hash_password;
use crate::auth::principal::Principal;
use crate::error::{check_max_len, store_err, ServiceError, ServiceResult};
use crate::models::project::{
    CreateProject, MemberSet, Project, ProjectSummary, ProjectView, UpdateProject,
};
use crate::models::task::{TaskKind, TaskView};
use crate::models::user::{CreateUser, User, UserRole, UserSummary};
use crate::store::populate::{project_view, project_views, task_views, ProjectJoin};
use crate::store::{StoreError, Stores};

/// Fields for a new user; every field is required
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

/// Fields for a new project
#[derive(Debug, Clone, Default)]
pub struct CreateProjectInput {
    pub name: String,
    pub scope_of_work: String,
    pub engineers: Vec<Uuid>,
    pub supervisors: Vec<Uuid>,
}

/// Partial project update
///
/// Blank strings are ignored. A provided member list replaces the stored
/// one, even when empty.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub scope_of_work: Option<String>,
    pub engineers: Option<Vec<Uuid>>,
    pub supervisors: Option<Vec<Uuid>>,
}

/// Both task kinds of one project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectTasks {
    /// `None` when the project does not exist (or no longer exists)
    pub project: Option<ProjectSummary>,
    pub daily_tasks: Vec<TaskView>,
    pub monthly_tasks: Vec<TaskView>,
}

fn required(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Administrator operations
#[derive(Clone)]
pub struct AdminOversight {
    stores: Stores,
    validate_members: bool,
}

impl AdminOversight {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            validate_members: false,
        }
    }

    /// Requires project member ids to name existing users of the matching
    /// role on create and update
    pub fn with_member_validation(mut self, enabled: bool) -> Self {
        self.validate_members = enabled;
        self
    }

    pub async fn list_users(&self, caller: &Principal) -> ServiceResult<Vec<UserSummary>> {
        Operation::AdminListUsers.authorize(caller)?;

        self.stores
            .users
            .list_users()
            .await
            .map_err(store_err("list_users", caller, None))
    }

    /// Creates an engineer or supervisor account
    pub async fn create_user(
        &self,
        caller: &Principal,
        input: CreateUserInput,
    ) -> ServiceResult<UserSummary> {
        Operation::AdminCreateUser.authorize(caller)?;

        let name = required("name", &input.name)?;
        check_max_len("name", &name, User::TEXT_MAX_LEN)?;
        let email = required("email", &input.email)?;
        check_max_len("email", &email, User::TEXT_MAX_LEN)?;
        if input.password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }
        let role = input
            .role
            .ok_or_else(|| ServiceError::Validation("role is required".to_string()))?;

        let existing = self
            .stores
            .users
            .find_user_by_email(&email)
            .await
            .map_err(store_err("create_user", caller, None))?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("Email already in use".to_string()));
        }

        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let user = match self
            .stores
            .users
            .create_user(CreateUser {
                name,
                email,
                password_hash,
                role,
            })
            .await
        {
            Ok(user) => user,
            Err(StoreError::Conflict(_)) => {
                return Err(ServiceError::Conflict("Email already in use".to_string()))
            }
            Err(e) => return Err(ServiceError::store_failure("create_user", caller, None, e)),
        };

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(UserSummary::from(&user))
    }

    /// Hard-deletes a user without touching projects or tasks
    pub async fn delete_user(&self, caller: &Principal, user_id: Uuid) -> ServiceResult<()> {
        Operation::AdminDeleteUser.authorize(caller)?;

        let deleted = self
            .stores
            .users
            .delete_user(user_id)
            .await
            .map_err(store_err("delete_user", caller, Some(user_id)))?;

        if !deleted {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    pub async fn list_projects(&self, caller: &Principal) -> ServiceResult<Vec<ProjectView>> {
        Operation::AdminListProjects.authorize(caller)?;

        let projects = self
            .stores
            .projects
            .list_projects()
            .await
            .map_err(store_err("list_projects", caller, None))?;

        project_views(&self.stores, projects)
            .await
            .map_err(store_err("list_projects", caller, None))
    }

    pub async fn get_project(&self, caller: &Principal, project_id: Uuid) -> ServiceResult<ProjectView> {
        Operation::AdminGetProject.authorize(caller)?;

        let project = self
            .stores
            .projects
            .find_project(project_id)
            .await
            .map_err(store_err("get_project", caller, Some(project_id)))?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        project_view(&self.stores, project)
            .await
            .map_err(store_err("get_project", caller, Some(project_id)))
    }

    pub async fn create_project(
        &self,
        caller: &Principal,
        input: CreateProjectInput,
    ) -> ServiceResult<ProjectView> {
        Operation::AdminCreateProject.authorize(caller)?;

        let name = required("name", &input.name)?;
        check_max_len("name", &name, Project::NAME_MAX_LEN)?;
        let scope_of_work = required("scope_of_work", &input.scope_of_work)?;
        let engineers = MemberSet::from(input.engineers);
        let supervisors = MemberSet::from(input.supervisors);

        self.check_members(caller, Some(&engineers), Some(&supervisors))
            .await?;

        let project = self
            .stores
            .projects
            .create_project(CreateProject {
                name,
                scope_of_work: Some(scope_of_work),
                engineers,
                supervisors,
            })
            .await
            .map_err(store_err("create_project", caller, None))?;

        info!(
            project_id = %project.id,
            engineers = project.engineers.len(),
            supervisors = project.supervisors.len(),
            "Project created"
        );

        project_view(&self.stores, project)
            .await
            .map_err(store_err("create_project", caller, None))
    }

    pub async fn update_project(
        &self,
        caller: &Principal,
        project_id: Uuid,
        input: UpdateProjectInput,
    ) -> ServiceResult<ProjectView> {
        Operation::AdminUpdateProject.authorize(caller)?;

        let update = UpdateProject {
            name: provided(input.name),
            scope_of_work: provided(input.scope_of_work),
            engineers: input.engineers.map(MemberSet::from),
            supervisors: input.supervisors.map(MemberSet::from),
        };

        if let Some(name) = &update.name {
            check_max_len("name", name, Project::NAME_MAX_LEN)?;
        }

        self.check_members(caller, update.engineers.as_ref(), update.supervisors.as_ref())
            .await?;

        // Nothing to write; report the stored project as is
        let stored = if update.is_empty() {
            self.stores.projects.find_project(project_id).await
        } else {
            self.stores.projects.update_project(project_id, update).await
        };

        let project = stored
            .map_err(store_err("update_project", caller, Some(project_id)))?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;

        info!(project_id = %project_id, "Project updated");

        project_view(&self.stores, project)
            .await
            .map_err(store_err("update_project", caller, Some(project_id)))
    }

    /// Deletes a project; its tasks stay behind with a dangling reference
    pub async fn delete_project(&self, caller: &Principal, project_id: Uuid) -> ServiceResult<()> {
        Operation::AdminDeleteProject.authorize(caller)?;

        let deleted = self
            .stores
            .projects
            .delete_project(project_id)
            .await
            .map_err(store_err("delete_project", caller, Some(project_id)))?;

        if !deleted {
            return Err(ServiceError::NotFound("Project not found".to_string()));
        }

        info!(project_id = %project_id, "Project deleted");
        Ok(())
    }

    /// Every task of one kind, with creator, reviewer and project summaries
    pub async fn list_all_tasks(&self, caller: &Principal, kind: TaskKind) -> ServiceResult<Vec<TaskView>> {
        Operation::AdminListAllTasks.authorize(caller)?;

        let tasks = self
            .stores
            .tasks
            .all_tasks(kind)
            .await
            .map_err(store_err("list_all_tasks", caller, None))?;

        debug!(kind = %kind, count = tasks.len(), "Listed all tasks");

        task_views(&self.stores, tasks, ProjectJoin::Include)
            .await
            .map_err(store_err("list_all_tasks", caller, None))
    }

    /// Daily and monthly tasks of one project, fetched concurrently
    ///
    /// An unknown project is not an error: both lists come back empty and
    /// `project` is `None`.
    pub async fn project_tasks(&self, caller: &Principal, project_id: Uuid) -> ServiceResult<ProjectTasks> {
        Operation::AdminProjectTasks.authorize(caller)?;

        let ids = [project_id];
        let (mut summaries, daily, monthly) = futures::try_join!(
            self.stores.projects.project_summaries(&ids),
            self.stores.tasks.tasks_for_project(TaskKind::Daily, project_id),
            self.stores.tasks.tasks_for_project(TaskKind::Monthly, project_id),
        )
        .map_err(store_err("project_tasks", caller, Some(project_id)))?;

        let (daily_tasks, monthly_tasks) = futures::try_join!(
            task_views(&self.stores, daily, ProjectJoin::Skip),
            task_views(&self.stores, monthly, ProjectJoin::Skip),
        )
        .map_err(store_err("project_tasks", caller, Some(project_id)))?;

        Ok(ProjectTasks {
            project: summaries.pop(),
            daily_tasks,
            monthly_tasks,
        })
    }

    async fn check_members(
        &self,
        caller: &Principal,
        engineers: Option<&MemberSet>,
        supervisors: Option<&MemberSet>,
    ) -> ServiceResult<()> {
        if !self.validate_members {
            return Ok(());
        }

        for (set, role) in [(engineers, UserRole::Engineer), (supervisors, UserRole::Supervisor)] {
            let Some(set) = set else { continue };
            if set.is_empty() {
                continue;
            }

            let found = self
                .stores
                .users
                .user_summaries(set.as_slice())
                .await
                .map_err(store_err("check_members", caller, None))?;

            for id in set.iter() {
                let matches = found.iter().any(|u| u.id == *id && u.role == role);
                if !matches {
                    return Err(ServiceError::Validation(format!(
                        "{} is not an existing {}",
                        id, role
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Bridge ").unwrap(), "Bridge");
        assert!(matches!(
            required("name", "   "),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_provided_ignores_blank() {
        assert_eq!(provided(None), None);
        assert_eq!(provided(Some("".to_string())), None);
        assert_eq!(provided(Some(" x ".to_string())), Some("x".to_string()));
    }
}
