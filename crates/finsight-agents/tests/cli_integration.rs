//! Integration tests against real LLM backends.
//!
//! These tests are `#[ignore]` by default. They require either:
//! - The `claude` CLI installed and on PATH with valid credentials, or
//! - A Gemini API key in `GEMINI_API_KEY`
//!
//! Run explicitly with:
//! ```bash
//! cargo test -p finsight-agents --test cli_integration -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use finsight_agents::claude_cli::{check_cli_available, invoke_claude, ClaudeCliConfig};
use finsight_agents::{
    ClaudeCliBackend, FinanceAgent, GeminiBackend, LlmBackend, LlmClient, RetryPolicy,
    TermExtractor,
};
use finsight_models::{CategoryCatalog, DuplicatePolicy, FraudAssessment, LlmConfig};

fn agent_for(backend: Arc<dyn LlmBackend>) -> FinanceAgent {
    let llm = LlmClient::new(backend, RetryPolicy::default());
    let extractor =
        TermExtractor::new(&CategoryCatalog::default(), DuplicatePolicy::First).unwrap();
    FinanceAgent::new(llm, extractor)
}

#[tokio::test]
#[ignore]
async fn cli_is_available() {
    assert!(check_cli_available().await, "claude CLI not found on PATH");
}

/// The fenced-JSON reply handling has to survive whatever the CLI prints.
#[tokio::test]
#[ignore]
async fn cli_fraud_reply_decodes() {
    if !check_cli_available().await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let backend = Arc::new(ClaudeCliBackend::new(ClaudeCliConfig {
        model: "claude-3-5-haiku-latest".to_string(),
        timeout: Duration::from_secs(60),
    }));
    let agent = agent_for(backend);

    let value = agent
        .assess_fraud_risk("Eight $999 card payments to a new overseas merchant within 10 minutes")
        .await
        .unwrap_or_else(|e| panic!("Reply did not decode: {e}"));

    FraudAssessment::from_reply(&value).expect("Reply has the fraud shape");
}

#[tokio::test]
#[ignore]
async fn cli_reports_errors_for_invalid_model() {
    if !check_cli_available().await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let config = ClaudeCliConfig {
        model: "nonexistent-model-12345".to_string(),
        timeout: Duration::from_secs(15),
    };

    let result = invoke_claude("hello", &config).await;
    assert!(result.is_err(), "Expected error for invalid model, got: {result:?}");
}

#[tokio::test]
#[ignore]
async fn gemini_stock_outlook_decodes() {
    let Ok(api_key) = std::env::var("GEMINI_API_KEY") else {
        eprintln!("Skipping: GEMINI_API_KEY not set");
        return;
    };

    let backend = GeminiBackend::new(&LlmConfig::default(), api_key).unwrap();
    let agent = agent_for(Arc::new(backend));

    let value = agent
        .stock_outlook("MSFT")
        .await
        .unwrap_or_else(|e| panic!("Reply did not decode: {e}"));
    assert!(value.get("recommendation").is_some(), "Unexpected reply: {value}");
}
