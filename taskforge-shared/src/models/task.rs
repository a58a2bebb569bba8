/// Task model and database operations
///
/// Tasks belong to a project (optionally), carry an optional assignee and
/// deadline, and move freely between the three statuses. There is no enforced
/// transition order: any authorized caller may set any status, including
/// moving a Done task back to To Do.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('to_do', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'to_do',
///     project_id BIGINT REFERENCES projects(id) ON DELETE CASCADE,
///     assigned_to BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     deadline DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// ```
///
/// "Overdue" is derived, never stored: a task is overdue when its deadline is
/// in the past and it is not Done. See [`is_overdue`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

/// Task status
///
/// Serialized on the wire as `"ToDo"`, `"InProgress"`, or `"Done"`; stored as
/// the Postgres enum `task_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    ToDo,

    /// Being worked on
    InProgress,

    /// Finished; a Done task is never overdue
    Done,
}

impl fmt::Display for TaskStatus {
    /// Human-readable label, used in AI context blocks
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        };
        f.write_str(label)
    }
}

/// Derives the overdue flag for a task snapshot
///
/// A task is overdue when it has a deadline strictly before `today` and its
/// status is not Done. Tasks without a deadline are never overdue. The result
/// depends on the date passed in, so callers recompute it on every read.
pub fn is_overdue(deadline: Option<NaiveDate>, status: TaskStatus, today: NaiveDate) -> bool {
    match deadline {
        Some(deadline) => deadline < today && status != TaskStatus::Done,
        None => false,
    }
}

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Current status (starts at ToDo)
    pub status: TaskStatus,

    /// Owning project, if any; deleting the project deletes the task
    pub project_id: Option<i64>,

    /// Assigned user, if any; deleting the user unassigns the task
    pub assigned_to: Option<i64>,

    /// Due date, date-only
    pub deadline: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whether this task is overdue as of `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.deadline, self.status, today)
    }
}

/// Input for creating a new task
///
/// Status is not an input: new tasks always start at ToDo.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub deadline: Option<NaiveDate>,
}

/// Task row joined with its assignee's name, for list responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskListing {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub project_id: Option<i64>,
    pub assigned_to: Option<i64>,

    /// Full name of the assignee, None when unassigned
    pub assigned_to_name: Option<String>,

    pub deadline: Option<NaiveDate>,
}

impl TaskListing {
    /// Whether this task is overdue as of `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.deadline, self.status, today)
    }
}

impl Task {
    /// Creates a new task in the database
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced project or user does not exist
    /// (foreign key violation) or the database connection fails. Callers
    /// should verify references first to report a clean not-found.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, project_id, assigned_to, deadline)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, status, project_id, assigned_to, deadline, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.assigned_to)
        .bind(data.deadline)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, project_id, assigned_to, deadline, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task with its assignee's name
    pub async fn list_all(pool: &PgPool) -> Result<Vec<TaskListing>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskListing>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.project_id,
                   t.assigned_to, u.full_name AS assigned_to_name, t.deadline
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            ORDER BY t.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists the tasks assigned to one user, with the assignee's name
    pub async fn list_assigned_to(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<TaskListing>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskListing>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.project_id,
                   t.assigned_to, u.full_name AS assigned_to_name, t.deadline
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            WHERE t.assigned_to = $1
            ORDER BY t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists the tasks belonging to one project
    ///
    /// Used by the metrics aggregation and the AI context builder.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, project_id, assigned_to, deadline, created_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Sets a task's status
    ///
    /// Returns true if the task was found and updated, false otherwise.
    pub async fn update_status(
        pool: &PgPool,
        id: i64,
        status: TaskStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task by ID (its comments cascade with it)
    ///
    /// Returns true if the task was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
