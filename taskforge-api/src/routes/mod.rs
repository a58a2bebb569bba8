/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: API banner and health check endpoints
/// - `auth`: Authentication endpoints (register, login)
/// - `projects`: Project listing, creation, deletion, metrics
/// - `tasks`: Task listing, creation, status updates, deletion
/// - `comments`: Task comments
/// - `users`: User management (admin)
/// - `ai`: AI assistant endpoint
use serde::{Deserialize, Serialize};

pub mod ai;
pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

/// Acknowledgement body used by mutation endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Acknowledgement body carrying the created row's ID
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Human-readable outcome
    pub message: String,

    /// ID of the created row
    pub id: i64,
}

impl CreatedResponse {
    pub fn new(message: impl Into<String>, id: i64) -> Self {
        Self {
            message: message.into(),
            id,
        }
    }
}
