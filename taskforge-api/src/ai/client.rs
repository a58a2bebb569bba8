/// Core completion client trait and types
///
/// This module defines the contract that all completion backends must
/// implement, plus the pure helpers that turn project rows into the text
/// context an assist request carries.
///
/// # Client Contract
///
/// All backends must:
/// 1. Implement the `CompletionClient` trait (async)
/// 2. Accept a fully resolved `CompletionRequest`
/// 3. Return the reply text, or a `CompletionError` describing the failure
///
/// Backends never see database handles. Context building happens in the
/// handler via `project_context`, so the trait stays trivially mockable.
use async_trait::async_trait;

use taskforge_shared::models::project::Project;
use taskforge_shared::models::task::Task;

/// Completion error types
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// No API key configured for the backend
    #[error("No completion API key configured")]
    MissingCredentials,

    /// Transport-level failure (connect, timeout, decode)
    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Completion backend returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Completion result type alias
pub type CompletionResult<T> = Result<T, CompletionError>;

/// A fully resolved assist request
///
/// `context` is empty when the request carried no resolvable project;
/// `prompt` is never empty (handlers substitute `default_prompt` first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Assist mode hint (e.g. "general", "risks")
    pub mode: String,

    /// Rendered project context, possibly empty
    pub context: String,

    /// The prompt to answer
    pub prompt: String,
}

/// Core completion client trait
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the backend name
    ///
    /// Used for logging.
    fn name(&self) -> &str;

    /// Sends one completion request and returns the reply text
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the request cannot be
    /// sent, or the backend answers with a non-success status.
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String>;
}

/// Renders a project and its tasks as assistant context
///
/// ```
/// use taskforge_api::ai::project_context;
/// use taskforge_shared::models::project::Project;
/// use chrono::Utc;
///
/// let project = Project {
///     id: 1,
///     title: "Billing rewrite".to_string(),
///     description: None,
///     created_by: None,
///     created_at: Utc::now(),
/// };
///
/// let context = project_context(&project, &[]);
/// assert!(context.starts_with("Project: Billing rewrite\n"));
/// assert!(context.contains("Description: N/A"));
/// ```
pub fn project_context(project: &Project, tasks: &[Task]) -> String {
    let description = project.description.as_deref().unwrap_or("N/A");
    let mut context = format!(
        "Project: {}\nDescription: {}\nTasks:\n",
        project.title, description
    );

    for task in tasks {
        let deadline = task
            .deadline
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        context.push_str(&format!(
            "- {} | {} | Deadline: {}\n",
            task.title, task.status, deadline
        ));
    }

    context
}

/// The prompt used when a request names a project but no prompt
pub fn default_prompt(context: &str) -> String {
    format!(
        "Summarize the following project and suggest next steps:\n\n{}",
        context
    )
}
