use thiserror::Error;

use crate::extractor::ExtractionError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("LLM backend error: {0}")]
    Backend(String),

    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),

    #[error("LLM request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("LLM request cancelled")]
    Cancelled,

    #[error("Unsupported file format")]
    UnsupportedFormat { file_name: String },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<lopdf::Error> for AgentError {
    fn from(err: lopdf::Error) -> Self {
        AgentError::Pdf(err.to_string())
    }
}
