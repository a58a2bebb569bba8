/// AI assistant backends
///
/// This module defines the completion client trait and provides
/// implementations for the supported backends.
///
/// # Architecture
///
/// The assist endpoint never talks to a vendor API directly. It builds a
/// `CompletionRequest` (mode, project context, prompt) and hands it to
/// whichever `CompletionClient` the server was started with:
///
/// - **Groq**: OpenAI-compatible chat completions over HTTPS
/// - **Mock**: Deterministic canned replies for testing/demo
///
/// # Example
///
/// ```no_run
/// use taskforge_api::ai::{CompletionClient, CompletionRequest, GroqClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GroqClient::new(Some("gsk_...".to_string()), "llama-3.3-70b-versatile")?;
///
/// let request = CompletionRequest {
///     mode: "general".to_string(),
///     context: String::new(),
///     prompt: "Suggest a sprint plan for a small backend team".to_string(),
/// };
///
/// let reply = client.complete(&request).await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub mod client;
pub mod groq;
pub mod mock;

// Re-export main types
pub use client::{
    default_prompt, project_context, CompletionClient, CompletionError, CompletionRequest,
    CompletionResult,
};
pub use groq::GroqClient;
pub use mock::MockCompletionClient;
