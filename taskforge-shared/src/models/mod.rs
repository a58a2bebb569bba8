/// Database models for TaskForge
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and the role enumeration
/// - `project`: Projects, list overviews, and read-side metrics
/// - `task`: Tasks, status lifecycle, and the overdue derivation
/// - `comment`: Task comments
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::models::user::{CreateUser, Role, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let new_user = CreateUser {
///     full_name: "Ada Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Developer,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod project;
pub mod task;
pub mod user;
