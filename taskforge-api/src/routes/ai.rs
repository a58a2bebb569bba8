/// AI assistant endpoint
///
/// # Endpoint
///
/// - `POST /api/ai/assist` - Ask the completion backend about a prompt,
///   a project, or both
///
/// The handler resolves the project (when given) into a text context,
/// picks the effective prompt, and hands everything to the configured
/// `CompletionClient`. Which backend answers is a deployment decision,
/// not a request parameter.
use crate::{
    ai::{default_prompt, project_context, CompletionRequest},
    app::AppState,
    error::{ApiError, ApiResult, Json},
    routes::MessageResponse,
};
use axum::{extract::State, Extension};
use serde::Deserialize;
use taskforge_shared::{
    auth::policy::Caller,
    models::{project::Project, task::Task},
};

/// Assist request
///
/// At least one of `prompt` and `project_id` must be present.
#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    /// Free-form question; defaults to a summarize-the-project prompt
    pub prompt: Option<String>,

    /// Project to build context from
    pub project_id: Option<i64>,

    /// Assist mode hint, threaded to the backend; defaults to "general"
    pub mode: Option<String>,
}

/// Ask the assistant
///
/// # Example
///
/// ```text
/// POST /api/ai/assist
/// Content-Type: application/json
///
/// { "project_id": 1, "mode": "risks" }
/// ```
///
/// Response:
/// ```json
/// { "message": "The project is at risk of slipping because..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Neither prompt nor project_id given
/// - `500 Internal Server Error`: Completion backend unavailable
pub async fn assist(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<AssistRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let prompt = req.prompt.as_deref().map(str::trim).filter(|p| !p.is_empty());

    if prompt.is_none() && req.project_id.is_none() {
        return Err(ApiError::Validation(
            "Provide 'prompt' or 'project_id'".to_string(),
        ));
    }

    // A project_id that doesn't resolve just yields an empty context;
    // the assistant still answers the prompt
    let context = match req.project_id {
        Some(project_id) => match Project::find_by_id(&state.db, project_id).await? {
            Some(project) => {
                let tasks = Task::list_by_project(&state.db, project_id).await?;
                project_context(&project, &tasks)
            }
            None => String::new(),
        },
        None => String::new(),
    };

    let prompt = match prompt {
        Some(p) => p.to_string(),
        None => default_prompt(&context),
    };

    let request = CompletionRequest {
        mode: req.mode.unwrap_or_else(|| "general".to_string()),
        context,
        prompt,
    };

    tracing::info!(
        user_id = caller.id,
        backend = state.ai.name(),
        mode = %request.mode,
        "Assist request"
    );

    let reply = state.ai.complete(&request).await?;

    Ok(Json(MessageResponse::new(reply)))
}
