//! Database models
//!
//! # Models
//!
//! - `user`: Engineer and supervisor accounts
//! - `project`: Projects and their membership lists
//! - `task`: Daily and monthly work items and their review state

pub mod project;
pub mod task;
pub mod user;

pub use project::{CreateProject, MemberSet, Project, ProjectSummary, ProjectView, UpdateProject};
pub use task::{NewTask, ReviewUpdate, Task, TaskKind, TaskStatus, TaskView};
pub use user::{CreateUser, User, UserRole, UserSummary};
