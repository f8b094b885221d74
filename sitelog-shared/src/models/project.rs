//! Project model and database operations
//!
//! A project carries two membership lists: the engineers who may log work
//! against it and the supervisors who may review that work. Both are stored
//! as UUID arrays and kept free of duplicates.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     scope_of_work TEXT,
//!     engineers UUID[] NOT NULL DEFAULT '{}',
//!     supervisors UUID[] NOT NULL DEFAULT '{}',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

const PROJECT_COLUMNS: &str =
    "id, name, scope_of_work, engineers, supervisors, created_at, updated_at";

/// Ordered set of user ids
///
/// Insertion order is preserved and duplicates are dropped on construction,
/// so a membership list can never name the same user twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Uuid>", into = "Vec<Uuid>")]
pub struct MemberSet(Vec<Uuid>);

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.0.contains(id)
    }

    /// Adds an id if not already present. Returns true if it was added.
    pub fn insert(&mut self, id: Uuid) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }
}

impl From<Vec<Uuid>> for MemberSet {
    fn from(ids: Vec<Uuid>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<MemberSet> for Vec<Uuid> {
    fn from(set: MemberSet) -> Self {
        set.0
    }
}

impl FromIterator<Uuid> for MemberSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        let mut set = MemberSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// A stored project
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    pub name: String,

    pub scope_of_work: Option<String>,

    /// Engineers allowed to create tasks in this project
    #[sqlx(try_from = "Vec<Uuid>")]
    pub engineers: MemberSet,

    /// Supervisors allowed to review tasks in this project
    #[sqlx(try_from = "Vec<Uuid>")]
    pub supervisors: MemberSet,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Column limit on `projects.name`
    pub const NAME_MAX_LEN: usize = 255;

    pub fn has_engineer(&self, user_id: &Uuid) -> bool {
        self.engineers.contains(user_id)
    }

    pub fn has_supervisor(&self, user_id: &Uuid) -> bool {
        self.supervisors.contains(user_id)
    }

    /// All member ids, engineers first
    pub fn member_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.engineers.iter().chain(self.supervisors.iter()).copied()
    }
}

/// Short project reference embedded in task listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub scope_of_work: Option<String>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        ProjectSummary {
            id: project.id,
            name: project.name.clone(),
            scope_of_work: project.scope_of_work.clone(),
        }
    }
}

/// Project with its member ids replaced by user summaries
///
/// Members that no longer exist are dropped from the view.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub scope_of_work: Option<String>,
    pub engineers: Vec<UserSummary>,
    pub supervisors: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectView {
    pub fn assemble(project: Project, users: &HashMap<Uuid, UserSummary>) -> Self {
        let resolve = |set: &MemberSet| -> Vec<UserSummary> {
            set.iter().filter_map(|id| users.get(id).cloned()).collect()
        };

        ProjectView {
            engineers: resolve(&project.engineers),
            supervisors: resolve(&project.supervisors),
            id: project.id,
            name: project.name,
            scope_of_work: project.scope_of_work,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Input for creating a project
#[derive(Debug, Clone, Default)]
pub struct CreateProject {
    pub name: String,
    pub scope_of_work: Option<String>,
    pub engineers: MemberSet,
    pub supervisors: MemberSet,
}

/// Partial update; `None` leaves a field unchanged
///
/// A provided membership list replaces the stored one wholesale, including
/// when it is empty.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub scope_of_work: Option<String>,
    pub engineers: Option<MemberSet>,
    pub supervisors: Option<MemberSet>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.scope_of_work.is_none()
            && self.engineers.is_none()
            && self.supervisors.is_none()
    }

    /// Applies the update to an in-memory project
    pub fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(scope) = self.scope_of_work {
            project.scope_of_work = Some(scope);
        }
        if let Some(engineers) = self.engineers {
            project.engineers = engineers;
        }
        if let Some(supervisors) = self.supervisors {
            project.supervisors = supervisors;
        }
    }
}

impl Project {
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, scope_of_work, engineers, supervisors) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(data.name)
            .bind(data.scope_of_work)
            .bind(data.engineers.as_slice())
            .bind(data.supervisors.as_slice())
            .fetch_one(pool)
            .await?;

        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Lists every project, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects ORDER BY created_at DESC, id DESC",
            PROJECT_COLUMNS
        );

        let projects = sqlx::query_as::<_, Project>(&query).fetch_all(pool).await?;

        Ok(projects)
    }

    /// Projects whose engineer list contains the user
    pub async fn list_for_engineer(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE $1 = ANY(engineers) ORDER BY created_at DESC, id DESC",
            PROJECT_COLUMNS
        );

        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(projects)
    }

    /// Projects whose supervisor list contains the user
    pub async fn list_for_supervisor(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE $1 = ANY(supervisors) ORDER BY created_at DESC, id DESC",
            PROJECT_COLUMNS
        );

        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(projects)
    }

    /// Applies a partial update, returning the stored result
    ///
    /// Returns `None` if the project does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.scope_of_work.is_some() {
            bind_count += 1;
            query.push_str(&format!(", scope_of_work = ${}", bind_count));
        }
        if data.engineers.is_some() {
            bind_count += 1;
            query.push_str(&format!(", engineers = ${}", bind_count));
        }
        if data.supervisors.is_some() {
            bind_count += 1;
            query.push_str(&format!(", supervisors = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", PROJECT_COLUMNS));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(scope) = data.scope_of_work {
            q = q.bind(scope);
        }
        if let Some(engineers) = data.engineers {
            q = q.bind(Vec::<Uuid>::from(engineers));
        }
        if let Some(supervisors) = data.supervisors {
            q = q.bind(Vec::<Uuid>::from(supervisors));
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project. Tasks that reference it are left in place.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn summaries(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let projects = sqlx::query_as::<_, ProjectSummary>(
            "SELECT id, name, scope_of_work FROM projects WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn project_with(engineers: Vec<Uuid>, supervisors: Vec<Uuid>) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Bridge".to_string(),
            scope_of_work: Some("Deck repairs".to_string()),
            engineers: engineers.into(),
            supervisors: supervisors.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_member_set_drops_duplicates() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let set = MemberSet::from(vec![a, b, a, a, b]);
        assert_eq!(set.as_slice(), &[a, b]);
    }

    #[test]
    fn test_member_set_deserialize_dedups() {
        let a = Uuid::new_v4();
        let json = serde_json::json!([a, a]);
        let set: MemberSet = serde_json::from_value(json).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&a));
    }

    #[test]
    fn test_membership_checks() {
        let eng = Uuid::new_v4();
        let sup = Uuid::new_v4();
        let project = project_with(vec![eng], vec![sup]);

        assert!(project.has_engineer(&eng));
        assert!(!project.has_engineer(&sup));
        assert!(project.has_supervisor(&sup));
        assert!(!project.has_supervisor(&eng));
        assert_eq!(project.member_ids().collect::<Vec<_>>(), vec![eng, sup]);
    }

    #[test]
    fn test_update_replaces_lists_even_when_empty() {
        let eng = Uuid::new_v4();
        let mut project = project_with(vec![eng], vec![]);

        UpdateProject {
            engineers: Some(MemberSet::new()),
            ..Default::default()
        }
        .apply_to(&mut project);

        assert!(project.engineers.is_empty());
        assert_eq!(project.name, "Bridge");
    }

    #[test]
    fn test_view_drops_missing_members() {
        let known = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let project = project_with(vec![known, gone], vec![]);

        let mut users = HashMap::new();
        users.insert(
            known,
            UserSummary {
                id: known,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: UserRole::Engineer,
            },
        );

        let view = ProjectView::assemble(project, &users);
        assert_eq!(view.engineers.len(), 1);
        assert_eq!(view.engineers[0].id, known);
        assert!(view.supervisors.is_empty());
    }
}
