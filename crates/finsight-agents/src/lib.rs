pub mod agent;
pub mod backend;
pub mod claude_cli;
pub mod client;
pub mod document;
pub mod error;
pub mod extractor;
pub mod gemini;
pub mod parser;
pub mod prompts;

pub mod test_support;

pub use agent::{FinanceAgent, UseCase};
pub use backend::LlmBackend;
pub use claude_cli::ClaudeCliBackend;
pub use client::{LlmClient, RetryPolicy, UNAVAILABLE_SENTINEL};
pub use error::AgentError;
pub use extractor::{ExtractionError, TermExtractor};
pub use gemini::GeminiBackend;
pub use parser::interpret;
