use serde::{Deserialize, Serialize};

use crate::catalog::CategoryCatalog;

/// Top-level configuration for finsight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FinsightConfig {
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
}

/// Which text-generation backend serves LLM requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    #[default]
    Gemini,
    ClaudeCli,
}

/// Configuration for the LLM client and its retry policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// Base URL of the generation API (ignored by the CLI provider).
    pub endpoint: String,
    /// Name of the environment variable holding the API credential.
    /// The credential itself never lives in a config file.
    pub api_key_env: String,
    /// Total attempts per request, including the first one.
    pub max_attempts: u32,
    /// Backoff unit in milliseconds. Attempt `n` (0-based) that fails waits
    /// `2^n` units before the next attempt.
    pub backoff_unit_ms: u64,
    /// Per-attempt timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: "gemini-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_attempts: 3,
            backoff_unit_ms: 1000,
            timeout_seconds: 60,
        }
    }
}

/// Which amount to keep when a term matches more than once in a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    First,
    Last,
}

/// Configuration for the term extractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ExtractionConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Replaces the built-in catalog when present.
    pub catalog: Option<CategoryCatalog>,
}

impl ExtractionConfig {
    pub fn catalog(&self) -> CategoryCatalog {
        self.catalog.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_finsight_config() {
        let config = FinsightConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: FinsightConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn default_retry_policy() {
        let llm = LlmConfig::default();
        assert_eq!(llm.max_attempts, 3);
        assert_eq!(llm.backoff_unit_ms, 1000);
        assert_eq!(llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(llm.provider, ProviderKind::Gemini);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: FinsightConfig = toml::from_str("").unwrap();
        assert_eq!(config, FinsightConfig::default());
        assert_eq!(config.extraction.catalog(), CategoryCatalog::default());
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
[llm]
provider = "claude-cli"
model = "claude-3-5-haiku-latest"
max_attempts = 5
backoff_unit_ms = 250

[extraction]
duplicate_policy = "last"

[[extraction.catalog]]
name = "income_statement"
terms = ["revenue", "ebitda"]
"#;

        let config: FinsightConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::ClaudeCli);
        assert_eq!(config.llm.max_attempts, 5);
        assert_eq!(config.llm.timeout_seconds, 60);
        assert_eq!(config.extraction.duplicate_policy, DuplicatePolicy::Last);

        let catalog = config.extraction.catalog();
        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(catalog.categories()[0].terms, ["revenue", "ebitda"]);
    }
}
