use async_trait::async_trait;

use crate::error::AgentError;

/// A single-shot text generation service. Mockable for testing.
///
/// Implementations make exactly one attempt per call; retries and backoff
/// belong to [`crate::client::LlmClient`].
#[async_trait]
pub trait LlmBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, AgentError>;
}
