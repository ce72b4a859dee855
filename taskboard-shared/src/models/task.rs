/// Task model and database operations
///
/// Tasks are the core entity of the system: created by one user, assigned
/// to another (or the same) user, and moved through a three-state status
/// enum. Deletion is soft: the row keeps its data and a `deleted_at`
/// marker excludes it from every read.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status VARCHAR(20) NOT NULL DEFAULT 'TODO',
///     assigned_to_id BIGINT NOT NULL REFERENCES users(id),
///     created_by BIGINT NOT NULL REFERENCES users(id),
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```
///
/// `created_by` is set once at creation from the acting identity and is
/// never touched by updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use std::str::FromStr;

/// Error returned when parsing an unrecognized status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized task status: {0}")]
pub struct InvalidStatus(pub String);

/// Task status
///
/// There is no enforced transition graph: any status may be set from any
/// other via update. Input strings are parsed through [`FromStr`], which
/// rejects anything outside the three known values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Newly created, not yet started
    Todo,

    /// Work has begun
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = InvalidStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Task model representing a stored task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short title
    pub title: String,

    /// Free-form description (empty string when not provided)
    pub description: String,

    /// Current status
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    /// User this task is assigned to
    pub assigned_to_id: i64,

    /// User who created the task; never changed after creation
    pub created_by: i64,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; a set value excludes the row from all reads
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Task row joined with the assignee's username
///
/// This is the read view every fetch returns: the task columns plus
/// `assigned_to`, resolved with a LEFT JOIN so a missing user yields
/// `None` rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskWithAssignee {
    /// Unique task ID
    pub id: i64,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Current status
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    /// User this task is assigned to
    pub assigned_to_id: i64,

    /// User who created the task
    pub created_by: i64,

    /// Assignee's username, when resolvable
    pub assigned_to: Option<String>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl TaskWithAssignee {
    /// Converts the read view back into a bare task row, for mutation
    pub fn into_task(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            assigned_to_id: self.assigned_to_id,
            created_by: self.created_by,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: None,
        }
    }
}

/// Input for creating a new task
///
/// Status is not an input: every task starts as `TODO` regardless of what
/// the request carried.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// User the task is assigned to (must exist)
    pub assigned_to_id: i64,

    /// Acting user, recorded as the creator
    pub created_by: i64,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

const TASK_COLUMNS: &str = "id, title, description, status, assigned_to_id, created_by, \
                            due_date, created_at, updated_at, deleted_at";

const JOINED_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.assigned_to_id, \
                              t.created_by, u.username AS assigned_to, t.due_date, \
                              t.created_at, t.updated_at";

impl Task {
    /// Creates a new task with status forced to `TODO`
    ///
    /// Takes any executor so the insert can run inside a transaction.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO tasks (title, description, status, assigned_to_id, created_by, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#,
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(TaskStatus::Todo.as_str())
            .bind(data.assigned_to_id)
            .bind(data.created_by)
            .bind(data.due_date)
            .fetch_one(executor)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID with the assignee joined
    ///
    /// Soft-deleted tasks are not found.
    pub async fn find_by_id(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to_id
            WHERE t.id = $1 AND t.deleted_at IS NULL
            "#,
        );

        let task = sqlx::query_as::<_, TaskWithAssignee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists tasks with offset/limit pagination, assignee joined
    ///
    /// Ordered by ID so pages are stable across requests.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to_id
            WHERE t.deleted_at IS NULL
            ORDER BY t.id
            LIMIT $1 OFFSET $2
            "#,
        );

        let tasks = sqlx::query_as::<_, TaskWithAssignee>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Counts tasks that are not soft-deleted
    ///
    /// The count and a page fetched by [`Task::list`] are separate queries
    /// and are not transactionally consistent with each other.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE deleted_at IS NULL")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Lists tasks assigned to a user, with offset/limit pagination
    pub async fn list_by_assignee(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to_id
            WHERE t.assigned_to_id = $1 AND t.deleted_at IS NULL
            ORDER BY t.id
            LIMIT $2 OFFSET $3
            "#,
        );

        let tasks = sqlx::query_as::<_, TaskWithAssignee>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Counts tasks assigned to a user that are not soft-deleted
    pub async fn count_by_assignee(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE assigned_to_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Writes the mutable fields of a task back to the store
    ///
    /// `created_by`, `created_at`, and the delete marker are deliberately
    /// not part of the statement. Returns `None` if the row is gone or was
    /// soft-deleted since it was loaded.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        task: &Task,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, assigned_to_id = $5,
                due_date = $6, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TASK_COLUMNS}
            "#,
        );

        let updated = sqlx::query_as::<_, Task>(&query)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.assigned_to_id)
            .bind(task.due_date)
            .fetch_optional(executor)
            .await?;

        Ok(updated)
    }

    /// Soft-deletes a task by setting its delete marker
    ///
    /// Returns `true` if a live row was marked, `false` if the task was
    /// already deleted or never existed.
    pub async fn soft_delete(executor: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
