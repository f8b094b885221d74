//! Task model and database operations
//!
//! Daily and monthly tasks share one shape and one table, discriminated by
//! `kind`. A task is bound to one project and one creator for its whole
//! life; after creation it only changes through a supervisor review.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     kind task_kind NOT NULL,
//!     project_id UUID NOT NULL,
//!     created_by UUID NOT NULL,
//!     title VARCHAR(500) NOT NULL,
//!     note TEXT,
//!     date TIMESTAMPTZ NOT NULL,
//!     status task_status NOT NULL DEFAULT 'pending',
//!     supervisor_note TEXT,
//!     reviewed_by UUID,
//!     reviewed_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! There are no foreign keys: deleting a user or project leaves its tasks
//! in place with a dangling reference.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::project::ProjectSummary;
use super::user::UserSummary;

const TASK_COLUMNS: &str = "id, kind, project_id, created_by, title, note, date, status, \
     supervisor_note, reviewed_by, reviewed_at, created_at, updated_at";

/// Daily or monthly
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Daily,
    Monthly,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Daily => "daily",
            TaskKind::Monthly => "monthly",
        }
    }

    /// Whether creation must supply an explicit date
    pub fn requires_date(&self) -> bool {
        matches!(self, TaskKind::Monthly)
    }

    /// SQL ORDER BY clause for listings of this kind
    ///
    /// Daily tasks are listed by creation time, monthly tasks by their work
    /// date; both newest first with the id as tie-break.
    pub fn listing_order(&self) -> &'static str {
        match self {
            TaskKind::Daily => "created_at DESC, id DESC",
            TaskKind::Monthly => "date DESC, id DESC",
        }
    }

    /// Comparator matching [`TaskKind::listing_order`]
    pub fn compare_newest_first(&self, a: &Task, b: &Task) -> Ordering {
        let key = |t: &Task| match self {
            TaskKind::Daily => t.created_at,
            TaskKind::Monthly => t.date,
        };
        key(b).cmp(&key(a)).then_with(|| b.id.cmp(&a.id))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status. Any value may replace any other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is not one of pending, done, failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task status '{0}', expected one of: pending, done, failed")]
pub struct ParseTaskStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(ParseTaskStatusError(other.to_string())),
        }
    }
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    pub kind: TaskKind,

    /// Owning project; may dangle after the project is deleted
    pub project_id: Uuid,

    /// Creating engineer; the only principal allowed to delete the task
    pub created_by: Uuid,

    pub title: String,

    pub note: Option<String>,

    /// Work date. Defaults to creation time for daily tasks.
    pub date: DateTime<Utc>,

    pub status: TaskStatus,

    pub supervisor_note: Option<String>,

    /// Supervisor who performed the most recent review
    pub reviewed_by: Option<Uuid>,

    pub reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a task
///
/// Status always starts as pending and the review fields start empty.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub kind: TaskKind,
    pub project_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
}

/// Review write; `None` leaves status or note unchanged
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub status: Option<TaskStatus>,
    pub supervisor_note: Option<String>,
    pub reviewed_by: Uuid,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewUpdate {
    pub fn apply_to(self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(note) = self.supervisor_note {
            task.supervisor_note = Some(note);
        }
        task.reviewed_by = Some(self.reviewed_by);
        task.reviewed_at = Some(self.reviewed_at);
        task.updated_at = self.reviewed_at;
    }
}

/// Task joined with its creator, reviewer and (for admin listings) project
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,

    pub creator: Option<UserSummary>,

    pub reviewer: Option<UserSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSummary>,
}

impl Task {
    /// Column limit on `tasks.title`
    pub const TITLE_MAX_LEN: usize = 500;

    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (kind, project_id, created_by, title, note, date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.kind)
            .bind(data.project_id)
            .bind(data.created_by)
            .bind(data.title)
            .bind(data.note)
            .bind(data.date)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task of the given kind; a task of the other kind is not found
    pub async fn find_by_id(
        pool: &PgPool,
        kind: TaskKind,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND kind = $2",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(kind)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    pub async fn list_by_project(
        pool: &PgPool,
        kind: TaskKind,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE kind = $1 AND project_id = $2 ORDER BY {}",
            TASK_COLUMNS,
            kind.listing_order()
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(kind)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    pub async fn list_all(pool: &PgPool, kind: TaskKind) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE kind = $1 ORDER BY {}",
            TASK_COLUMNS,
            kind.listing_order()
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(kind)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Writes a review in a single statement
    ///
    /// Returns `None` if the task no longer exists.
    pub async fn apply_review(
        pool: &PgPool,
        kind: TaskKind,
        id: Uuid,
        review: ReviewUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET \
                status = COALESCE($3, status), \
                supervisor_note = COALESCE($4, supervisor_note), \
                reviewed_by = $5, \
                reviewed_at = $6, \
                updated_at = $6 \
             WHERE id = $1 AND kind = $2 RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(kind)
            .bind(review.status)
            .bind(review.supervisor_note)
            .bind(review.reviewed_by)
            .bind(review.reviewed_at)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    pub async fn delete(pool: &PgPool, kind: TaskKind, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task_at(kind: TaskKind, created_at: DateTime<Utc>, date: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            kind,
            project_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            title: "Inspect rebar".to_string(),
            note: None,
            date,
            status: TaskStatus::Pending,
            supervisor_note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("pending".parse(), Ok(TaskStatus::Pending));
        assert_eq!("done".parse(), Ok(TaskStatus::Done));
        assert_eq!("failed".parse(), Ok(TaskStatus::Failed));
        assert_eq!(
            "approved".parse::<TaskStatus>(),
            Err(ParseTaskStatusError("approved".to_string()))
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn test_only_monthly_requires_date() {
        assert!(TaskKind::Monthly.requires_date());
        assert!(!TaskKind::Daily.requires_date());
    }

    #[test]
    fn test_daily_orders_by_created_at() {
        let now = Utc::now();
        let older = task_at(TaskKind::Daily, now - Duration::hours(2), now);
        let newer = task_at(TaskKind::Daily, now, now - Duration::days(30));

        let mut tasks = vec![older.clone(), newer.clone()];
        tasks.sort_by(|a, b| TaskKind::Daily.compare_newest_first(a, b));
        assert_eq!(tasks[0].id, newer.id);
    }

    #[test]
    fn test_monthly_orders_by_date() {
        let now = Utc::now();
        let march = task_at(TaskKind::Monthly, now, now - Duration::days(60));
        let april = task_at(TaskKind::Monthly, now - Duration::days(5), now - Duration::days(30));

        let mut tasks = vec![march.clone(), april.clone()];
        tasks.sort_by(|a, b| TaskKind::Monthly.compare_newest_first(a, b));
        assert_eq!(tasks[0].id, april.id);
    }

    #[test]
    fn test_review_preserves_omitted_fields() {
        let now = Utc::now();
        let mut task = task_at(TaskKind::Daily, now, now);
        task.status = TaskStatus::Done;
        task.supervisor_note = Some("earlier".to_string());
        let reviewer = Uuid::new_v4();

        ReviewUpdate {
            status: None,
            supervisor_note: None,
            reviewed_by: reviewer,
            reviewed_at: now,
        }
        .apply_to(&mut task);

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.supervisor_note.as_deref(), Some("earlier"));
        assert_eq!(task.reviewed_by, Some(reviewer));
        assert_eq!(task.reviewed_at, Some(now));
    }

    #[test]
    fn test_view_flattens_task() {
        let now = Utc::now();
        let task = task_at(TaskKind::Daily, now, now);
        let view = TaskView {
            task: task.clone(),
            creator: None,
            reviewer: None,
            project: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], serde_json::json!(task.id));
        assert_eq!(json["status"], "pending");
        assert_eq!(json["kind"], "daily");
        assert!(json["creator"].is_null());
        assert!(json.get("project").is_none());
    }
}
