/// User model and database operations
///
/// This module provides the User model, the closed [`Role`] enumeration, and the
/// CRUD operations the API layer uses to manage accounts.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     full_name VARCHAR(120) NOT NULL,
///     email VARCHAR(120) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'developer',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::models::user::{CreateUser, Role, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let new_user = CreateUser {
///     full_name: "Ada Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Developer,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Account role, the sole input to the authorization policy
///
/// Stored as the Postgres enum `user_role`; serialized on the wire as
/// `"Admin"`, `"Manager"`, or `"Developer"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    /// Full control: user administration, project deletion, everything below
    Admin,

    /// Creates and deletes projects' tasks, creates projects, sees all tasks
    Manager,

    /// Works assigned tasks only; may comment anywhere
    Developer,
}

impl Role {
    /// Stable lowercase name, used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Developer => "developer",
        }
    }

    /// Whether task listings for this role span all tasks
    ///
    /// Developers only see tasks assigned to them; Admins and Managers see
    /// every task.
    pub fn can_view_all_tasks(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the hash
/// is never serialized into a response.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Display name
    pub full_name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account role
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    pub role: Role,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database connection fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use taskforge_shared::models::user::{CreateUser, Role, User};
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let user = User::create(
    ///     &pool,
    ///     CreateUser {
    ///         full_name: "Ada Lovelace".to_string(),
    ///         email: "ada@example.com".to_string(),
    ///         password_hash: "$argon2id$...".to_string(),
    ///         role: Role::Manager,
    ///     },
    /// )
    /// .await?;
    /// println!("Created user: {}", user.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, password_hash, role, created_at
            "#,
        )
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// Returns the user if found, None otherwise.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use taskforge_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// if let Some(user) = User::find_by_email(&pool, "ada@example.com").await? {
    ///     println!("Found user: {}", user.id);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether an email address is already registered
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Lists all users, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, role, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates a user's role
    ///
    /// Returns true if the user was found and updated, false otherwise.
    pub async fn update_role(pool: &PgPool, id: i64, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// The user's comments go with them; their task assignments and created
    /// projects are kept with the reference nulled out.
    ///
    /// Returns true if the user was deleted, false if they didn't exist.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
