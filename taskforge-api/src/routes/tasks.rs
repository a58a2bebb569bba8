/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks/` - List tasks (role-scoped)
/// - `POST /api/tasks/` - Create task (Admin/Manager)
/// - `PATCH /api/tasks/:id/status` - Update task status
/// - `DELETE /api/tasks/:id` - Delete task (Admin/Manager)
///
/// # Visibility
///
/// Admin and Manager see every task; a Developer sees only tasks assigned
/// to them. The scoping happens here, not in the client.
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
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskforge_shared::{
    auth::policy::{authorize, Action, Caller},
    models::{
        project::Project,
        task::{CreateTask, Task, TaskListing, TaskStatus},
        user::User,
    },
};
use validator::Validate;

/// Task list item
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub project_id: Option<i64>,
    pub assigned_to: Option<i64>,

    /// Assignee's full name, "Unassigned" when nobody is assigned
    pub assigned_to_name: String,

    /// Due date, `YYYY-MM-DD`
    pub deadline: Option<NaiveDate>,

    /// Derived against today's date on every read
    pub is_overdue: bool,
}

impl TaskResponse {
    fn from_listing(listing: TaskListing, today: NaiveDate) -> Self {
        let is_overdue = listing.is_overdue(today);
        TaskResponse {
            id: listing.id,
            title: listing.title,
            description: listing.description,
            status: listing.status,
            project_id: listing.project_id,
            assigned_to: listing.assigned_to,
            assigned_to_name: listing
                .assigned_to_name
                .unwrap_or_else(|| "Unassigned".to_string()),
            deadline: listing.deadline,
            is_overdue,
        }
    }
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    pub project_id: Option<i64>,

    pub assigned_to: Option<i64>,

    /// `YYYY-MM-DD`
    pub deadline: Option<NaiveDate>,
}

/// Update status request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

/// List tasks visible to the caller
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let listings = if caller.role.can_view_all_tasks() {
        Task::list_all(&state.db).await?
    } else {
        Task::list_assigned_to(&state.db, caller.id).await?
    };

    let today = Utc::now().date_naive();
    let response = listings
        .into_iter()
        .map(|listing| TaskResponse::from_listing(listing, today))
        .collect();

    Ok(Json(response))
}

/// Create a task
///
/// New tasks always start at ToDo; status is not an input.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: Caller is not Admin or Manager
/// - `404 Not Found`: Referenced project or assignee does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    authorize(&caller, &Action::CreateTask)?;
    req.validate().map_err(ApiError::from_validation)?;

    // Resolve references before inserting so the caller gets a 404
    // instead of a constraint error
    if let Some(project_id) = req.project_id {
        Project::find_by_id(&state.db, project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    }

    if let Some(user_id) = req.assigned_to {
        User::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Assigned user not found".to_string()))?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            project_id: req.project_id,
            assigned_to: req.assigned_to,
            deadline: req.deadline,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, user_id = caller.id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("Task created", task.id)),
    ))
}

/// Update a task's status
///
/// Admin and Manager can move any task; a Developer only tasks assigned
/// to them. Any status can move to any other status.
///
/// # Errors
///
/// - `403 Forbidden`: Developer touching someone else's task
/// - `404 Not Found`: No task with this ID
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    // Existence check first: an unknown task is a 404 for everyone,
    // not a 403 for developers
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    authorize(
        &caller,
        &Action::UpdateTaskStatus {
            assignee: task.assigned_to,
        },
    )?;

    let updated = Task::update_status(&state.db, id, req.status).await?;
    if !updated {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = id, user_id = caller.id, status = %req.status, "Task status updated");

    Ok(Json(MessageResponse::new("Status updated")))
}

/// Delete a task
///
/// Cascades to the task's comments.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not Admin or Manager
/// - `404 Not Found`: No task with this ID
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    authorize(&caller, &Action::DeleteTask)?;

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = id, user_id = caller.id, "Task deleted");

    Ok(Json(MessageResponse::new("Task deleted")))
}
