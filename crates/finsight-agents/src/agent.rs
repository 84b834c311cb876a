use std::sync::Arc;
use std::time::Instant;

use finsight_models::{AnalysisReport, FailureKind, ReplyError};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::client::LlmClient;
use crate::document::{extract_pdf_text, is_pdf_file_name};
use crate::error::AgentError;
use crate::extractor::TermExtractor;
use crate::parser::interpret;
use crate::prompts::{
    expense_prompt, fraud_prompt, stock_outlook_prompt, DOCUMENT_ANALYSIS_PREFIX,
};

/// The structured use-cases and the uniform message each reports on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCase {
    StockOutlook,
    ExpenseCategorization,
    FraudRisk,
}

impl UseCase {
    pub fn name(&self) -> &'static str {
        match self {
            UseCase::StockOutlook => "stock_outlook",
            UseCase::ExpenseCategorization => "expense_categorization",
            UseCase::FraudRisk => "fraud_risk",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            UseCase::StockOutlook => "Failed to analyze stock",
            UseCase::ExpenseCategorization => "Failed to process receipt",
            UseCase::FraudRisk => "Failed to assess fraud risk",
        }
    }
}

/// Composes extraction, the LLM client and reply interpretation into the
/// four use-cases. Cheap to clone; every call is an independent request.
#[derive(Clone)]
pub struct FinanceAgent {
    llm: Arc<LlmClient>,
    extractor: Arc<TermExtractor>,
    cancel: CancellationToken,
}

impl FinanceAgent {
    pub fn new(llm: LlmClient, extractor: TermExtractor) -> Self {
        Self {
            llm: Arc::new(llm),
            extractor: Arc::new(extractor),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns the token that cancels this agent's in-flight requests.
    ///
    /// A cancelled token stays cancelled: every later request on this agent
    /// (and its clones) fails as cancelled. Hosts that serve more than one
    /// request should hand each one its own token via
    /// [`with_cancellation`](Self::with_cancellation).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// A handle sharing this agent's client and extractor but cancelled
    /// through `token`, e.g. one token per user action.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            llm: Arc::clone(&self.llm),
            extractor: Arc::clone(&self.extractor),
            cancel: token,
        }
    }

    /// Document analysis for an uploaded file. Only PDFs are accepted; any
    /// other file is rejected before the LLM is contacted.
    pub async fn analyze_document(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<AnalysisReport, AgentError> {
        if !is_pdf_file_name(file_name) {
            warn!(file_name, "Rejected unsupported upload");
            return Err(AgentError::UnsupportedFormat {
                file_name: file_name.to_string(),
            });
        }

        let text = extract_pdf_text(bytes)?;
        info!(file_name, text_len = text.len(), "Read PDF upload");
        self.analyze_text(&text).await
    }

    /// Extract known terms and ask the model for a free-form analysis.
    ///
    /// The analysis is returned verbatim and may be the unavailability
    /// sentinel; an unparseable amount fails the whole request.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, AgentError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("document_analysis", %request_id);

        async {
            let start = Instant::now();
            let structured_data = self.extractor.extract(text)?;
            let ai_analysis = self
                .llm
                .invoke(DOCUMENT_ANALYSIS_PREFIX, text, &self.cancel)
                .await;

            info!(
                categories = structured_data.len(),
                analysis_len = ai_analysis.len(),
                elapsed_ms = start.elapsed().as_millis(),
                "Document analysis complete"
            );

            Ok(AnalysisReport {
                structured_data,
                ai_analysis,
            })
        }
        .instrument(span)
        .await
    }

    pub async fn stock_outlook(&self, ticker: &str) -> Result<serde_json::Value, ReplyError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(invalid_input(UseCase::StockOutlook));
        }
        let prompt = stock_outlook_prompt(ticker);
        self.structured(UseCase::StockOutlook, "", &prompt).await
    }

    pub async fn categorize_expense(
        &self,
        receipt_text: &str,
    ) -> Result<serde_json::Value, ReplyError> {
        if receipt_text.trim().is_empty() {
            return Err(invalid_input(UseCase::ExpenseCategorization));
        }
        let prompt = expense_prompt(receipt_text);
        self.structured(UseCase::ExpenseCategorization, "", &prompt)
            .await
    }

    pub async fn assess_fraud_risk(
        &self,
        transactions: &str,
    ) -> Result<serde_json::Value, ReplyError> {
        if transactions.trim().is_empty() {
            return Err(invalid_input(UseCase::FraudRisk));
        }
        // This use-case sends the prompt as the prefix with an empty payload.
        let prompt = fraud_prompt(transactions);
        self.structured(UseCase::FraudRisk, &prompt, "").await
    }

    async fn structured(
        &self,
        use_case: UseCase,
        prefix: &str,
        payload: &str,
    ) -> Result<serde_json::Value, ReplyError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("use_case", use_case = use_case.name(), %request_id);

        async {
            let start = Instant::now();
            let raw = self
                .llm
                .try_invoke(prefix, payload, &self.cancel)
                .await
                .map_err(|e| {
                    warn!(error = %e, "No reply from LLM");
                    let kind = match e {
                        AgentError::Cancelled => FailureKind::Cancelled,
                        _ => FailureKind::Transport,
                    };
                    ReplyError::new(kind, use_case.failure_message())
                })?;

            let value = interpret(&raw, use_case.failure_message())?;
            info!(elapsed_ms = start.elapsed().as_millis(), "Use-case complete");
            Ok(value)
        }
        .instrument(span)
        .await
    }
}

fn invalid_input(use_case: UseCase) -> ReplyError {
    warn!(use_case = use_case.name(), "Empty input, request not sent");
    ReplyError::new(FailureKind::InvalidInput, use_case.failure_message())
}
