//! Fixtures shared by the integration tests
//!
//! Builds an in-memory store seeded with one project, two engineers and two
//! supervisors. Only `E1` and `S1` are members of the project.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sitelog_shared::auth::principal::Principal;
use sitelog_shared::lifecycle::{CreateTaskInput, TaskLifecycle};
use sitelog_shared::models::project::{CreateProject, MemberSet, Project};
use sitelog_shared::models::task::TaskKind;
use sitelog_shared::models::task::TaskView;
use sitelog_shared::models::user::{CreateUser, User, UserRole};
use sitelog_shared::oversight::AdminOversight;
use sitelog_shared::store::Stores;
use uuid::Uuid;

pub struct Fixture {
    pub stores: Stores,
    pub lifecycle: TaskLifecycle,
    pub oversight: AdminOversight,
    pub project: Project,
    pub e1: User,
    pub e2: User,
    pub s1: User,
    pub s2: User,
}

impl Fixture {
    pub fn e1(&self) -> Principal {
        Principal::engineer(self.e1.id)
    }

    pub fn e2(&self) -> Principal {
        Principal::engineer(self.e2.id)
    }

    pub fn s1(&self) -> Principal {
        Principal::supervisor(self.s1.id)
    }

    pub fn s2(&self) -> Principal {
        Principal::supervisor(self.s2.id)
    }

    /// E1 creates a task in the fixture project
    pub async fn create_as_e1(&self, kind: TaskKind, title: &str) -> TaskView {
        self.lifecycle
            .create_task(&self.e1(), kind, task_input(self.project.id, title, Some(Utc::now())))
            .await
            .expect("E1 should be able to create tasks")
    }
}

pub fn task_input(project_id: Uuid, title: &str, date: Option<DateTime<Utc>>) -> CreateTaskInput {
    CreateTaskInput {
        project_id,
        title: title.to_string(),
        note: None,
        date,
    }
}

async fn seed_user(stores: &Stores, name: &str, role: UserRole) -> User {
    stores
        .users
        .create_user(CreateUser {
            name: name.to_string(),
            email: format!("{}@sitelog.test", name.to_lowercase()),
            password_hash: "$argon2id$unused".to_string(),
            role,
        })
        .await
        .expect("seed user")
}

pub async fn fixture() -> Fixture {
    let stores = Stores::in_memory();

    let e1 = seed_user(&stores, "E1", UserRole::Engineer).await;
    let e2 = seed_user(&stores, "E2", UserRole::Engineer).await;
    let s1 = seed_user(&stores, "S1", UserRole::Supervisor).await;
    let s2 = seed_user(&stores, "S2", UserRole::Supervisor).await;

    let project = stores
        .projects
        .create_project(CreateProject {
            name: "Riverside Bridge".to_string(),
            scope_of_work: Some("Deck and pier works".to_string()),
            engineers: MemberSet::from(vec![e1.id]),
            supervisors: MemberSet::from(vec![s1.id]),
        })
        .await
        .expect("seed project");

    Fixture {
        lifecycle: TaskLifecycle::new(stores.clone()),
        oversight: AdminOversight::new(stores.clone()),
        stores,
        project,
        e1,
        e2,
        s1,
        s2,
    }
}
