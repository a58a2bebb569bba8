/// Project model, metrics aggregation, and database operations
///
/// Projects own tasks: deleting a project cascades to its tasks and,
/// transitively, their comments. The creator reference is optional and nulls
/// out if the creating user is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     created_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::task::{Task, TaskStatus};

/// Project entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: i64,

    /// Project title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Creating user, if still present
    pub created_by: Option<i64>,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
    pub created_by: Option<i64>,
}

/// Project row shaped for list responses: creator name and task count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectOverview {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,

    /// Creator's full name, None when the creator was deleted
    pub created_by: Option<String>,

    pub task_count: i64,
}

/// Read-side metrics over a project's task set
///
/// Computed fresh on every call; task state can change between reads, so
/// nothing here is cached or stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectMetrics {
    /// Total number of tasks
    pub total: usize,

    /// Tasks with status Done
    pub done: usize,

    /// Tasks with status InProgress
    pub in_progress: usize,

    /// Tasks with status ToDo
    pub todo: usize,

    /// Tasks past their deadline and not Done, as of `today`
    pub overdue: usize,

    /// `floor(done / total * 100)`, 0 for an empty project
    pub progress: usize,
}

impl ProjectMetrics {
    /// Computes metrics over a snapshot of a project's tasks
    ///
    /// Pure function of the task set and the given date.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use taskforge_shared::models::project::ProjectMetrics;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    /// let metrics = ProjectMetrics::compute(&[], today);
    /// assert_eq!(metrics.total, 0);
    /// assert_eq!(metrics.progress, 0);
    /// ```
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let done = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count();
        let in_progress = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count();
        let todo = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::ToDo)
            .count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
        let progress = if total > 0 { done * 100 / total } else { 0 };

        Self {
            total,
            done,
            in_progress,
            todo,
            overdue,
            progress,
        }
    }
}

impl Project {
    /// Creates a new project in the database
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, created_by, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, created_by, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects with creator names and task counts
    pub async fn list_overview(pool: &PgPool) -> Result<Vec<ProjectOverview>, sqlx::Error> {
        let projects = sqlx::query_as::<_, ProjectOverview>(
            r#"
            SELECT p.id, p.title, p.description, u.full_name AS created_by,
                   COUNT(t.id) AS task_count
            FROM projects p
            LEFT JOIN users u ON u.id = p.created_by
            LEFT JOIN tasks t ON t.project_id = p.id
            GROUP BY p.id, u.full_name
            ORDER BY p.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Deletes a project by ID
    ///
    /// Cascade removes its tasks and their comments. Returns true if the
    /// project was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
