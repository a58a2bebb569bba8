/// Project endpoints
///
/// # Endpoints
///
/// - `GET /api/projects/` - List projects with creator name and task count
/// - `POST /api/projects/` - Create project (Admin/Manager)
/// - `DELETE /api/projects/:id` - Delete project (Admin)
/// - `GET /api/projects/:id/metrics` - Aggregated task metrics
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
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskforge_shared::{
    auth::policy::{authorize, Action, Caller},
    models::{
        project::{CreateProject, Project, ProjectMetrics},
        task::Task,
    },
};
use validator::Validate;

/// Project list item
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,

    /// Creator's full name, "Unknown" when the creator was deleted
    pub created_by: String,

    /// Number of tasks currently in the project
    pub task_count: i64,
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,
}

/// List all projects
///
/// Visible to every authenticated user regardless of role.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = Project::list_overview(&state.db).await?;

    let response = projects
        .into_iter()
        .map(|p| ProjectResponse {
            id: p.id,
            title: p.title,
            description: p.description,
            created_by: p.created_by.unwrap_or_else(|| "Unknown".to_string()),
            task_count: p.task_count,
        })
        .collect();

    Ok(Json(response))
}

/// Create a project
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: Caller is not Admin or Manager
pub async fn create_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    authorize(&caller, &Action::CreateProject)?;
    req.validate().map_err(ApiError::from_validation)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            title: req.title,
            description: req.description,
            created_by: Some(caller.id),
        },
    )
    .await?;

    tracing::info!(project_id = project.id, user_id = caller.id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("Project created", project.id)),
    ))
}

/// Delete a project
///
/// Cascades to the project's tasks and their comments.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not Admin
/// - `404 Not Found`: No project with this ID
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    authorize(&caller, &Action::DeleteProject)?;

    let deleted = Project::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    tracing::info!(project_id = id, user_id = caller.id, "Project deleted");

    Ok(Json(MessageResponse::new("Project deleted")))
}

/// Project metrics
///
/// Aggregates the project's current task set; nothing is precomputed or
/// stored, so two calls around a task update can disagree.
///
/// # Response
///
/// ```json
/// {
///   "total": 4,
///   "done": 2,
///   "in_progress": 1,
///   "todo": 1,
///   "overdue": 1,
///   "progress": 50
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No project with this ID
pub async fn project_metrics(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProjectMetrics>> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let tasks = Task::list_by_project(&state.db, id).await?;
    let metrics = ProjectMetrics::compute(&tasks, Utc::now().date_naive());

    Ok(Json(metrics))
}
