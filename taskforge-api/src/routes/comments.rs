/// Comment endpoints
///
/// # Endpoints
///
/// - `GET /api/comments/task/:task_id` - List a task's comments, newest first
/// - `POST /api/comments/task/:task_id` - Comment on a task
/// - `DELETE /api/comments/:id` - Delete a comment (author or Admin)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, Json},
    routes::{CreatedResponse, MessageResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use serde::{Deserialize, Serialize};
use taskforge_shared::{
    auth::policy::{authorize, Action, Caller},
    models::{
        comment::{Comment, CreateComment},
        task::Task,
        user::Role,
    },
};
use validator::Validate;

/// Comment list item
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,

    /// Author's full name
    pub user_name: String,

    /// Author's role at read time
    pub user_role: Role,

    /// `YYYY-MM-DD HH:MM:SS`
    pub created_at: String,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// List a task's comments, newest first
///
/// A task ID with no comments and an unknown task ID both answer with an
/// empty list; comment reads never 404.
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let comments = Comment::list_for_task(&state.db, task_id).await?;

    let response = comments
        .into_iter()
        .map(|c| CommentResponse {
            id: c.id,
            content: c.content,
            user_name: c.user_name,
            user_role: c.user_role,
            created_at: c.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    Ok(Json(response))
}

/// Comment on a task
///
/// Every role may comment; the task must exist.
///
/// # Errors
///
/// - `400 Bad Request`: Empty content
/// - `404 Not Found`: No task with this ID
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<i64>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    authorize(&caller, &Action::CreateComment)?;
    req.validate().map_err(ApiError::from_validation)?;

    Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            content: req.content,
            task_id,
            user_id: caller.id,
        },
    )
    .await?;

    tracing::info!(comment_id = comment.id, task_id, user_id = caller.id, "Comment added");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("Comment added", comment.id)),
    ))
}

/// Delete a comment
///
/// Allowed for the comment's author and for Admins.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is neither the author nor Admin
/// - `404 Not Found`: No comment with this ID
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let comment = Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    authorize(
        &caller,
        &Action::DeleteComment {
            author: comment.user_id,
        },
    )?;

    Comment::delete(&state.db, id).await?;

    tracing::info!(comment_id = id, user_id = caller.id, "Comment deleted");

    Ok(Json(MessageResponse::new("Comment deleted")))
}
