use std::time::Duration;

use async_trait::async_trait;
use finsight_models::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::LlmBackend;
use crate::error::AgentError;

/// Backend for the Gemini `generateContent` REST endpoint.
pub struct GeminiBackend {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiBackend {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, AgentError> {
        if api_key.trim().is_empty() {
            return Err(AgentError::Config(format!(
                "empty API key (set {})",
                config.api_key_env
            )));
        }

        let timeout = Duration::from_secs(config.timeout_seconds);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini");

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout(self.timeout.as_secs())
                } else {
                    AgentError::Backend(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini returned an error status");
            return Err(AgentError::Backend(format!("Gemini returned {status}: {detail}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Backend(format!("unreadable Gemini response: {e}")))?;

        reply_text(parsed)
    }
}

/// Concatenate the text parts of the first candidate.
fn reply_text(response: GenerateResponse) -> Result<String, AgentError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::Backend("Gemini returned no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AgentError::Backend(format!(
            "Gemini returned empty text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn reply_text_joins_parts() {
        let response = parse(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "```json\n"}, {"text": "{}\n```"}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(reply_text(response).unwrap(), "```json\n{}\n```");
    }

    #[test]
    fn no_candidates_is_an_error() {
        let response = parse(serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(matches!(reply_text(response), Err(AgentError::Backend(_))));
    }

    #[test]
    fn empty_text_reports_finish_reason() {
        let response = parse(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }));
        let err = reply_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn url_uses_model_and_trims_endpoint() {
        let config = LlmConfig {
            endpoint: "https://example.test/v1beta/".to_string(),
            ..LlmConfig::default()
        };
        let backend = GeminiBackend::new(&config, "test-key".to_string()).unwrap();
        assert_eq!(
            backend.url(),
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        let result = GeminiBackend::new(&LlmConfig::default(), "  ".to_string());
        assert!(matches!(result, Err(AgentError::Config(_))));
    }
}
