/// Groq completion backend
///
/// Talks to Groq's OpenAI-compatible chat completions endpoint. One
/// request per assist call, no streaming creates a simple contract: the
/// reply is the first choice's message content, or an empty string when
/// the backend returns no choices.
///
/// # Configuration
///
/// - `GROQ_API_KEY`: bearer token; requests fail with `MissingCredentials`
///   when unset
/// - `GROQ_MODEL`: model name (default: llama-3.3-70b-versatile)
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai::client::{CompletionClient, CompletionError, CompletionRequest, CompletionResult};

/// Chat completions endpoint
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// System prompt sent with every assist request
const SYSTEM_PROMPT: &str = "You are an expert project assistant for software teams.";

/// Groq completion client
pub struct GroqClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GroqClient {
    /// Creates a new Groq client
    ///
    /// `api_key` may be `None`; the client then rejects every request
    /// with `MissingCredentials` instead of failing at startup, so the
    /// rest of the API stays usable without a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> CompletionResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(GroqClient {
            http,
            api_key,
            model: model.into(),
        })
    }
}

/// Chat completion request payload
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_completion_tokens: u32,
}

/// One chat message
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

/// Chat completion response payload
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl CompletionClient for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredentials)?;

        let user_message = format!(
            "Mode: {}\n\nContext:\n{}\n\nUser Prompt:\n{}",
            request.mode, request.context, request.prompt
        );

        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: 0.4,
            max_completion_tokens: 512,
        };

        tracing::debug!(model = %self.model, mode = %request.mode, "Sending completion request");

        let response = self
            .http
            .post(GROQ_API_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Completion backend rejected request");
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;

        Ok(chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name() {
        let client = GroqClient::new(None, "llama-3.3-70b-versatile").unwrap();
        assert_eq!(client.name(), "groq");
    }

    #[tokio::test]
    async fn test_missing_key_rejected_before_any_io() {
        let client = GroqClient::new(None, "llama-3.3-70b-versatile").unwrap();
        let request = CompletionRequest {
            mode: "general".to_string(),
            context: String::new(),
            prompt: "hello".to_string(),
        };

        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredentials));
    }

    #[test]
    fn test_chat_request_serialization() {
        let payload = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: "Mode: general\n\nContext:\n\n\nUser Prompt:\nhi".to_string(),
                },
            ],
            temperature: 0.4,
            max_completion_tokens: 512,
        };

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["temperature"], 0.4);
        assert_eq!(json["max_completion_tokens"], 512);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_chat_response_first_choice() {
        let json = serde_json::json!({
            "id": "chatcmpl-123",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "First" } },
                { "index": 1, "message": { "role": "assistant", "content": "Second" } }
            ]
        });

        let response: ChatResponse = serde_json::from_value(json).unwrap();
        let reply = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        assert_eq!(reply, "First");
    }

    #[test]
    fn test_chat_response_no_choices() {
        let json = serde_json::json!({ "id": "chatcmpl-123" });

        let response: ChatResponse = serde_json::from_value(json).unwrap();
        assert!(response.choices.is_empty());
    }
}
