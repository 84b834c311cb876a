use std::sync::Arc;
use std::time::Duration;

use finsight_models::LlmConfig;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::LlmBackend;
use crate::error::AgentError;

/// Returned by [`LlmClient::invoke`] once every attempt has failed.
/// Callers treat it as terminal, non-JSON text.
pub const UNAVAILABLE_SENTINEL: &str = "System busy - please try later";

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Failed attempt `n` (0-based) waits `2^n` units before the next one.
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_unit: Duration::from_millis(config.backoff_unit_ms),
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// Sends prompts to an [`LlmBackend`] with retry, backoff and cancellation.
pub struct LlmClient {
    backend: Arc<dyn LlmBackend>,
    policy: RetryPolicy,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn LlmBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Send `prefix + payload`, retrying failed attempts.
    ///
    /// Cancellation is honored both during a backend call and during a
    /// backoff sleep.
    pub async fn try_invoke(
        &self,
        prefix: &str,
        payload: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        let prompt = format!("{prefix}{payload}");
        let max_attempts = self.policy.max_attempts;
        let start = Instant::now();
        debug!(
            backend = self.backend.name(),
            prompt_len = prompt.len(),
            max_attempts,
            "Sending prompt"
        );

        let mut last_error = None;

        for attempt in 0..max_attempts {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                result = self.backend.generate(&prompt) => result,
            };

            match result {
                Ok(text) => {
                    info!(
                        backend = self.backend.name(),
                        attempt = attempt + 1,
                        reply_len = text.len(),
                        elapsed_ms = start.elapsed().as_millis(),
                        "LLM reply received"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    if attempt + 1 < max_attempts {
                        let backoff = self.policy.delay_for(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts,
                            backoff_ms = backoff.as_millis(),
                            error = %e,
                            "LLM call failed, retrying"
                        );
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                            _ = sleep(backoff) => {}
                        }
                    } else {
                        warn!(attempt = attempt + 1, max_attempts, error = %e, "LLM call failed");
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(AgentError::RetriesExhausted {
            attempts: max_attempts,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts were made".to_string()),
        })
    }

    /// Like [`try_invoke`](Self::try_invoke), but any failure degrades to
    /// [`UNAVAILABLE_SENTINEL`].
    pub async fn invoke(&self, prefix: &str, payload: &str, cancel: &CancellationToken) -> String {
        match self.try_invoke(prefix, payload, cancel).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "LLM unavailable, returning sentinel");
                UNAVAILABLE_SENTINEL.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedBackend;

    fn client(backend: Arc<ScriptedBackend>) -> LlmClient {
        LlmClient::new(
            backend,
            RetryPolicy {
                max_attempts: 3,
                backoff_unit: Duration::from_secs(1),
            },
        )
    }

    #[test]
    fn delays_double_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(
            policy.delay_for(40),
            Duration::from_secs(u64::from(u32::MAX))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_two_failures_with_backoff() {
        let backend = Arc::new(ScriptedBackend::fail_then(2, "analysis"));
        let client = client(backend.clone());

        let start = Instant::now();
        let text = client
            .invoke("prefix:", "payload", &CancellationToken::new())
            .await;

        assert_eq!(text, "analysis");
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(backend.call_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_return_sentinel() {
        let backend = Arc::new(ScriptedBackend::always_failing("503 Service Unavailable"));
        let client = client(backend.clone());

        let text = client.invoke("", "prompt", &CancellationToken::new()).await;

        assert_eq!(text, UNAVAILABLE_SENTINEL);
        assert_eq!(backend.call_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn no_sleep_after_final_attempt() {
        let backend = Arc::new(ScriptedBackend::always_failing("boom"));
        let client = client(backend);

        let start = Instant::now();
        let result = client.try_invoke("", "prompt", &CancellationToken::new()).await;

        match result {
            Err(AgentError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.contains("boom"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn prompt_is_prefix_then_payload() {
        let backend = Arc::new(ScriptedBackend::always("ok"));
        let client = client(backend.clone());

        client
            .invoke("Analyze this:\n", "Revenue: 10", &CancellationToken::new())
            .await;

        assert_eq!(backend.prompts().await, ["Analyze this:\nRevenue: 10"]);
    }

    #[tokio::test]
    async fn success_is_returned_unmodified() {
        let raw = "```json\n{\"a\": 1}\n```";
        let client = client(Arc::new(ScriptedBackend::always(raw)));
        let text = client.invoke("", "x", &CancellationToken::new()).await;
        assert_eq!(text, raw);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let backend = Arc::new(ScriptedBackend::always_failing("down"));
        let client = client(backend.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let result = client.try_invoke("", "prompt", &cancel).await;
        assert!(matches!(result, Err(AgentError::Cancelled)));
        assert_eq!(backend.call_count().await, 1);
    }

    #[tokio::test]
    async fn cancellation_interrupts_pending_call() {
        let client = client(Arc::new(ScriptedBackend::hanging()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client.try_invoke("", "prompt", &cancel).await;
        assert!(matches!(result, Err(AgentError::Cancelled)));
        assert_eq!(
            client.invoke("", "prompt", &cancel).await,
            UNAVAILABLE_SENTINEL
        );
    }

    #[tokio::test]
    async fn zero_attempts_is_exhausted_immediately() {
        let backend = Arc::new(ScriptedBackend::always("never sent"));
        let client = LlmClient::new(
            backend.clone(),
            RetryPolicy {
                max_attempts: 0,
                backoff_unit: Duration::from_secs(1),
            },
        );

        let result = client.try_invoke("", "prompt", &CancellationToken::new()).await;
        assert!(matches!(
            result,
            Err(AgentError::RetriesExhausted { attempts: 0, .. })
        ));
        assert_eq!(backend.call_count().await, 0);
    }
}
