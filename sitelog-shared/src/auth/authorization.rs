//! Authorization guard
//!
//! Access is decided in two stages, both run inside the lifecycle engine
//! and the oversight layer:
//!
//! 1. **Role class**: every [`Operation`] declares the roles that may call
//!    it; [`authorize`] checks the caller's role against that set.
//! 2. **Resource predicate**: membership of the project's engineer or
//!    supervisor list, or ownership of the task.
//!
//! The HTTP route-class gate reuses [`authorize`] so both layers agree.
//!
//! # Example
//!
//! ```
//! use sitelog_shared::auth::authorization::{authorize, Operation};
//! use sitelog_shared::auth::principal::Role;
//!
//! assert!(authorize(Role::Engineer, Operation::CreateTask.required_roles()).is_ok());
//! assert!(authorize(Role::Admin, Operation::CreateTask.required_roles()).is_err());
//! ```

use uuid::Uuid;

use super::principal::{Principal, Role};
use crate::models::project::Project;
use crate::models::task::Task;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Role '{role}' is not permitted to perform this operation")]
    RoleNotPermitted { role: Role },

    #[error("Not an engineer on project {0}")]
    NotProjectEngineer(Uuid),

    #[error("Not a supervisor on project {0}")]
    NotProjectSupervisor(Uuid),

    #[error("Not the creator of task {0}")]
    NotTaskOwner(Uuid),

    /// The project a membership check depends on does not exist
    #[error("Project {0} is not accessible")]
    ProjectUnavailable(Uuid),
}

/// Every operation exposed by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateTask,
    DeleteTask,
    ReviewTask,
    ListTasksForProject,
    GetTask,
    ListEngineerProjects,
    ListSupervisedProjects,
    AdminListUsers,
    AdminCreateUser,
    AdminDeleteUser,
    AdminListProjects,
    AdminGetProject,
    AdminCreateProject,
    AdminUpdateProject,
    AdminDeleteProject,
    AdminListAllTasks,
    AdminProjectTasks,
}

const ENGINEER: &[Role] = &[Role::Engineer];
const SUPERVISOR: &[Role] = &[Role::Supervisor];
const ADMIN: &[Role] = &[Role::Admin];
const ANY_ROLE: &[Role] = &[Role::Engineer, Role::Supervisor, Role::Admin];

impl Operation {
    /// Roles allowed to invoke the operation
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Operation::CreateTask | Operation::DeleteTask | Operation::ListEngineerProjects => {
                ENGINEER
            }
            Operation::ReviewTask | Operation::ListSupervisedProjects => SUPERVISOR,
            Operation::ListTasksForProject | Operation::GetTask => ANY_ROLE,
            Operation::AdminListUsers
            | Operation::AdminCreateUser
            | Operation::AdminDeleteUser
            | Operation::AdminListProjects
            | Operation::AdminGetProject
            | Operation::AdminCreateProject
            | Operation::AdminUpdateProject
            | Operation::AdminDeleteProject
            | Operation::AdminListAllTasks
            | Operation::AdminProjectTasks => ADMIN,
        }
    }

    /// Stage one for a concrete caller
    pub fn authorize(&self, caller: &Principal) -> Result<(), AuthzError> {
        authorize(caller.role(), self.required_roles())
    }
}

/// Checks a role against an allowed set
pub fn authorize(role: Role, required: &[Role]) -> Result<(), AuthzError> {
    if required.contains(&role) {
        Ok(())
    } else {
        Err(AuthzError::RoleNotPermitted { role })
    }
}

pub fn is_project_engineer(project: &Project, user_id: &Uuid) -> bool {
    project.has_engineer(user_id)
}

pub fn is_project_supervisor(project: &Project, user_id: &Uuid) -> bool {
    project.has_supervisor(user_id)
}

pub fn is_task_owner(task: &Task, user_id: &Uuid) -> bool {
    task.created_by == *user_id
}

/// Caller must be a user listed among the project's engineers
pub fn require_project_engineer(project: &Project, caller: &Principal) -> Result<(), AuthzError> {
    match caller.user_id() {
        Some(id) if is_project_engineer(project, &id) => Ok(()),
        _ => Err(AuthzError::NotProjectEngineer(project.id)),
    }
}

/// Caller must be a user listed among the project's supervisors
pub fn require_project_supervisor(project: &Project, caller: &Principal) -> Result<(), AuthzError> {
    match caller.user_id() {
        Some(id) if is_project_supervisor(project, &id) => Ok(()),
        _ => Err(AuthzError::NotProjectSupervisor(project.id)),
    }
}

/// Caller must have created the task. The administrator owns nothing.
pub fn require_task_owner(task: &Task, caller: &Principal) -> Result<(), AuthzError> {
    match caller.user_id() {
        Some(id) if is_task_owner(task, &id) => Ok(()),
        _ => Err(AuthzError::NotTaskOwner(task.id)),
    }
}

/// Read access to a project's tasks: its engineers, its supervisors, or the
/// administrator
pub fn require_project_reader(project: &Project, caller: &Principal) -> Result<(), AuthzError> {
    match caller {
        Principal::Admin => Ok(()),
        Principal::User { role, .. } => match Role::from(*role) {
            Role::Engineer => require_project_engineer(project, caller),
            _ => require_project_supervisor(project, caller),
        },
    }
}
