/// Mock completion client for testing and demos
///
/// Returns a canned reply and records every request it receives, so tests
/// can assert on the exact context and prompt the assist endpoint built.
/// No network, no credentials.
///
/// # Example
///
/// ```
/// use taskforge_api::ai::{CompletionClient, CompletionRequest, MockCompletionClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MockCompletionClient::new("Looks on track.");
///
/// let request = CompletionRequest {
///     mode: "general".to_string(),
///     context: String::new(),
///     prompt: "Status?".to_string(),
/// };
///
/// assert_eq!(client.complete(&request).await?, "Looks on track.");
/// assert_eq!(client.requests().len(), 1);
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use std::sync::Mutex;

use crate::ai::client::{CompletionClient, CompletionError, CompletionRequest, CompletionResult};

/// Mock completion client
pub struct MockCompletionClient {
    reply: String,
    fail: bool,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    /// Creates a mock that answers every request with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        MockCompletionClient {
            reply: reply.into(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock that fails every request with an upstream error
    pub fn failing() -> Self {
        MockCompletionClient {
            reply: String::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of every request seen so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail {
            return Err(CompletionError::Upstream {
                status: 503,
                body: "mock backend unavailable".to_string(),
            });
        }

        Ok(self.reply.clone())
    }
}
