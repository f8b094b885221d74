//! In-memory adapter for the store ports
//!
//! Holds every record in a single `RwLock`-guarded state so each operation
//! is atomic with respect to the others, mirroring row-level behaviour of
//! the Postgres adapter closely enough for the lifecycle tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{HealthProbe, ProjectStore, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};
use crate::models::task::{NewTask, ReviewUpdate, Task, TaskKind, TaskStatus};
use crate::models::user::{CreateUser, User, UserSummary};

/// Thread-safe in-memory store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        let state = self.read()?;
        let mut users: Vec<&User> = state.users.values().collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    async fn user_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<UserSummary>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .map(UserSummary::from)
            .collect())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.write()?.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            scope_of_work: data.scope_of_work,
            engineers: data.engineers,
            supervisors: data.supervisors,
            created_at: now,
            updated_at: now,
        };
        self.write()?.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        newest_first(&mut projects, |p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn projects_for_engineer(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| p.has_engineer(&user_id))
            .cloned()
            .collect();
        newest_first(&mut projects, |p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn projects_for_supervisor(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| p.has_supervisor(&user_id))
            .cloned()
            .collect();
        newest_first(&mut projects, |p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        let mut state = self.write()?;
        let Some(project) = state.projects.get_mut(&id) else {
            return Ok(None);
        };

        data.apply_to(project);
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.write()?.projects.remove(&id).is_some())
    }

    async fn project_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<ProjectSummary>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.projects.get(id))
            .map(ProjectSummary::from)
            .collect())
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn insert_task(&self, data: NewTask) -> StoreResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            kind: data.kind,
            project_id: data.project_id,
            created_by: data.created_by,
            title: data.title,
            note: data.note,
            date: data.date,
            status: TaskStatus::Pending,
            supervisor_note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.write()?.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, kind: TaskKind, id: Uuid) -> StoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).filter(|t| t.kind == kind).cloned())
    }

    async fn tasks_for_project(&self, kind: TaskKind, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| t.kind == kind && t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| kind.compare_newest_first(a, b));
        Ok(tasks)
    }

    async fn all_tasks(&self, kind: TaskKind) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| t.kind == kind)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| kind.compare_newest_first(a, b));
        Ok(tasks)
    }

    async fn apply_review(
        &self,
        kind: TaskKind,
        id: Uuid,
        review: ReviewUpdate,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.write()?;
        let Some(task) = state.tasks.get_mut(&id).filter(|t| t.kind == kind) else {
            return Ok(None);
        };

        review.apply_to(task);
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, kind: TaskKind, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        if !state.tasks.get(&id).is_some_and(|t| t.kind == kind) {
            return Ok(false);
        }
        Ok(state.tasks.remove(&id).is_some())
    }
}

#[async_trait]
impl HealthProbe for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::MemberSet;
    use crate::models::user::UserRole;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Engineer,
        }
    }

    fn new_task(kind: TaskKind, project_id: Uuid) -> NewTask {
        NewTask {
            kind,
            project_id,
            created_by: Uuid::new_v4(),
            title: "Survey".to_string(),
            note: None,
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();

        let err = store.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_summaries_skip_unknown_ids() {
        let store = InMemoryStore::new();
        let user = store.create_user(new_user("b@example.com")).await.unwrap();

        let summaries = store
            .user_summaries(&[user.id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, user.id);
    }

    #[tokio::test]
    async fn test_task_lookup_is_kind_scoped() {
        let store = InMemoryStore::new();
        let task = store
            .insert_task(new_task(TaskKind::Daily, Uuid::new_v4()))
            .await
            .unwrap();

        assert!(store.find_task(TaskKind::Monthly, task.id).await.unwrap().is_none());
        assert!(!store.delete_task(TaskKind::Monthly, task.id).await.unwrap());
        assert!(store.find_task(TaskKind::Daily, task.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_review_on_missing_task_returns_none() {
        let store = InMemoryStore::new();
        let review = ReviewUpdate {
            status: Some(TaskStatus::Done),
            supervisor_note: None,
            reviewed_by: Uuid::new_v4(),
            reviewed_at: Utc::now(),
        };

        let result = store
            .apply_review(TaskKind::Daily, Uuid::new_v4(), review)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_member_queries() {
        let store = InMemoryStore::new();
        let eng = Uuid::new_v4();
        let sup = Uuid::new_v4();
        store
            .create_project(CreateProject {
                name: "Tunnel".to_string(),
                scope_of_work: None,
                engineers: MemberSet::from(vec![eng]),
                supervisors: MemberSet::from(vec![sup]),
            })
            .await
            .unwrap();

        assert_eq!(store.projects_for_engineer(eng).await.unwrap().len(), 1);
        assert!(store.projects_for_engineer(sup).await.unwrap().is_empty());
        assert_eq!(store.projects_for_supervisor(sup).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_project_returns_none() {
        let store = InMemoryStore::new();
        let updated = store
            .update_project(Uuid::new_v4(), UpdateProject::default())
            .await
            .unwrap();
        assert!(updated.is_none());
    }
}
