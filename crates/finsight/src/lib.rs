//! Finsight - LLM-assisted financial analysis
//!
//! Extracts known financial terms from documents and asks a text-generation
//! model for document analysis, stock outlooks, expense categorization and
//! fraud-risk assessment.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use finsight::models::FinsightConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let agent = finsight::build_agent(&FinsightConfig::default())?;
//! let outlook = agent.stock_outlook("AAPL").await;
//! # Ok(())
//! # }
//! ```

pub use finsight_agents as agents;
pub use finsight_models as models;

use std::sync::Arc;

use anyhow::Context;
use finsight_agents::claude_cli::ClaudeCliConfig;
use finsight_agents::{
    ClaudeCliBackend, FinanceAgent, GeminiBackend, LlmBackend, LlmClient, RetryPolicy,
    TermExtractor, UseCase,
};
use finsight_models::{ExpenseRecord, FinsightConfig, FraudAssessment, ProviderKind, StockOutlook};
use tracing::info;

/// Shown alongside every result.
pub const DISCLAIMER: &str = "Note: This tool provides informational insights only, \
     not financial advice. Always consult a qualified professional.";

/// Load configuration from a TOML file.
pub fn load_config(path: &str) -> Result<FinsightConfig, anyhow::Error> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config: {path}"))
}

/// Build a `FinanceAgent` from configuration, reading the API credential from
/// the environment variable the config names.
pub fn build_agent(config: &FinsightConfig) -> Result<FinanceAgent, anyhow::Error> {
    let api_key = std::env::var(&config.llm.api_key_env).ok();
    build_agent_with_key(config, api_key)
}

pub fn build_agent_with_key(
    config: &FinsightConfig,
    api_key: Option<String>,
) -> Result<FinanceAgent, anyhow::Error> {
    let backend: Arc<dyn LlmBackend> = match config.llm.provider {
        ProviderKind::Gemini => {
            let key = api_key.with_context(|| {
                format!(
                    "Gemini provider needs an API key in ${}",
                    config.llm.api_key_env
                )
            })?;
            Arc::new(GeminiBackend::new(&config.llm, key)?)
        }
        ProviderKind::ClaudeCli => {
            Arc::new(ClaudeCliBackend::new(ClaudeCliConfig::from(&config.llm)))
        }
    };

    let extractor = TermExtractor::new(
        &config.extraction.catalog(),
        config.extraction.duplicate_policy,
    )
    .context("Failed to compile term catalog")?;

    let llm = LlmClient::new(backend, RetryPolicy::from_config(&config.llm));
    info!(
        backend = llm.backend_name(),
        model = %config.llm.model,
        max_attempts = config.llm.max_attempts,
        "Built finance agent"
    );

    Ok(FinanceAgent::new(llm, extractor))
}

/// One-line human summary of a decoded use-case reply, read through the typed
/// views. `None` when the reply has none of the expected fields.
pub fn summarize(use_case: UseCase, reply: &serde_json::Value) -> Option<String> {
    let line = match use_case {
        UseCase::StockOutlook => {
            let outlook = StockOutlook::from_reply(reply).ok()?;
            if outlook.recommendation.is_empty() {
                return None;
            }
            format!(
                "Recommendation: {} (1 week: {}, 1 month: {}, 1 year: {})",
                outlook.recommendation,
                outlook.predictions.one_week,
                outlook.predictions.one_month,
                outlook.predictions.one_year
            )
        }
        UseCase::ExpenseCategorization => {
            let record = ExpenseRecord::from_reply(reply).ok()?;
            if record.vendor.is_empty() && record.category.is_empty() {
                return None;
            }
            let date = record
                .parsed_date()
                .map(|d| d.format("%d %b %Y").to_string())
                .unwrap_or_else(|| record.date.clone());
            format!(
                "{}: {:.2} on {} ({})",
                record.vendor, record.amount, date, record.category
            )
        }
        UseCase::FraudRisk => {
            let assessment = FraudAssessment::from_reply(reply).ok()?;
            format!(
                "Risk level: {} ({} suspicious patterns, {} recommended actions)",
                assessment.risk_level,
                assessment.suspicious_patterns.len(),
                assessment.recommended_actions.len()
            )
        }
    };
    Some(line)
}
