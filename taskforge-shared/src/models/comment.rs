/// Comment model and database operations
///
/// Comments hang off tasks and always have a resolvable author: both
/// references are required, and deleting either the task or the author
/// cascades the comment away.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id BIGSERIAL PRIMARY KEY,
///     content TEXT NOT NULL,
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::user::Role;

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: i64,

    /// Comment text
    pub content: String,

    /// Task the comment belongs to
    pub task_id: i64,

    /// Authoring user; deletion rights hinge on this
    pub user_id: i64,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub content: String,
    pub task_id: i64,
    pub user_id: i64,
}

/// Comment row joined with its author, for list responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentListing {
    pub id: i64,
    pub content: String,
    pub user_name: String,
    pub user_role: Role,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment on a task
    ///
    /// Callers verify the task exists first; a dangling task reference
    /// surfaces as a foreign key violation.
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, task_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, task_id, user_id, created_at
            "#,
        )
        .bind(data.content)
        .bind(data.task_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, content, task_id, user_id, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists a task's comments with author name and role, newest first
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: i64,
    ) -> Result<Vec<CommentListing>, sqlx::Error> {
        let comments = sqlx::query_as::<_, CommentListing>(
            r#"
            SELECT c.id, c.content, u.full_name AS user_name, u.role AS user_role, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.task_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Deletes a comment by ID
    ///
    /// Returns true if the comment was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
