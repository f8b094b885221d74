//! Joins tasks and projects with the users and projects they reference
//!
//! References that no longer resolve (deleted user or project) come back as
//! `None` or are dropped from member lists; they never fail the read.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::{StoreResult, Stores};
use crate::models::project::{Project, ProjectSummary, ProjectView};
use crate::models::task::{Task, TaskView};
use crate::models::user::UserSummary;

/// Whether task views should carry a project summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectJoin {
    Skip,
    Include,
}

async fn user_index(stores: &Stores, ids: HashSet<Uuid>) -> StoreResult<HashMap<Uuid, UserSummary>> {
    let ids: Vec<Uuid> = ids.into_iter().collect();
    let users = stores.users.user_summaries(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Attaches creator, reviewer and optionally project summaries
pub async fn task_views(
    stores: &Stores,
    tasks: Vec<Task>,
    join: ProjectJoin,
) -> StoreResult<Vec<TaskView>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids = tasks
        .iter()
        .flat_map(|t| std::iter::once(t.created_by).chain(t.reviewed_by))
        .collect();
    let users = user_index(stores, user_ids).await?;

    let projects: HashMap<Uuid, ProjectSummary> = match join {
        ProjectJoin::Skip => HashMap::new(),
        ProjectJoin::Include => {
            let ids: Vec<Uuid> = tasks
                .iter()
                .map(|t| t.project_id)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            stores
                .projects
                .project_summaries(&ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        }
    };

    Ok(tasks
        .into_iter()
        .map(|task| TaskView {
            creator: users.get(&task.created_by).cloned(),
            reviewer: task.reviewed_by.and_then(|id| users.get(&id).cloned()),
            project: projects.get(&task.project_id).cloned(),
            task,
        })
        .collect())
}

/// Single-task form of [`task_views`] without the project join
pub async fn task_view(stores: &Stores, task: Task) -> StoreResult<TaskView> {
    let mut views = task_views(stores, vec![task.clone()], ProjectJoin::Skip).await?;
    Ok(views.pop().unwrap_or(TaskView {
        task,
        creator: None,
        reviewer: None,
        project: None,
    }))
}

/// Resolves member ids of each project to user summaries
pub async fn project_views(stores: &Stores, projects: Vec<Project>) -> StoreResult<Vec<ProjectView>> {
    let ids = projects.iter().flat_map(|p| p.member_ids()).collect();
    let users = user_index(stores, ids).await?;

    Ok(projects
        .into_iter()
        .map(|p| ProjectView::assemble(p, &users))
        .collect())
}

pub async fn project_view(stores: &Stores, project: Project) -> StoreResult<ProjectView> {
    let ids = project.member_ids().collect();
    let users = user_index(stores, ids).await?;
    Ok(ProjectView::assemble(project, &users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::{CreateProject, MemberSet};
    use crate::models::task::{NewTask, TaskKind};
    use crate::models::user::{CreateUser, UserRole};
    use chrono::Utc;

    #[tokio::test]
    async fn test_dangling_references_become_none() {
        let stores = Stores::in_memory();
        let creator = stores
            .users
            .create_user(CreateUser {
                name: "Eng".to_string(),
                email: "eng@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Engineer,
            })
            .await
            .unwrap();

        let task = stores
            .tasks
            .insert_task(NewTask {
                kind: TaskKind::Daily,
                project_id: Uuid::new_v4(),
                created_by: creator.id,
                title: "Orphan".to_string(),
                note: None,
                date: Utc::now(),
            })
            .await
            .unwrap();

        let views = task_views(&stores, vec![task], ProjectJoin::Include)
            .await
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].creator.as_ref().map(|c| c.id), Some(creator.id));
        assert!(views[0].reviewer.is_none());
        assert!(views[0].project.is_none());
    }

    #[tokio::test]
    async fn test_project_view_resolves_members() {
        let stores = Stores::in_memory();
        let sup = stores
            .users
            .create_user(CreateUser {
                name: "Sup".to_string(),
                email: "sup@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Supervisor,
            })
            .await
            .unwrap();

        let project = stores
            .projects
            .create_project(CreateProject {
                name: "Dam".to_string(),
                scope_of_work: None,
                engineers: MemberSet::from(vec![Uuid::new_v4()]),
                supervisors: MemberSet::from(vec![sup.id]),
            })
            .await
            .unwrap();

        let view = project_view(&stores, project).await.unwrap();
        assert!(view.engineers.is_empty());
        assert_eq!(view.supervisors.len(), 1);
        assert_eq!(view.supervisors[0].name, "Sup");
    }
}
