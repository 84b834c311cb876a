pub mod catalog;
pub mod config;
pub mod reply;
pub mod report;

pub use catalog::{CategoryCatalog, CategoryTerms};
pub use config::{DuplicatePolicy, ExtractionConfig, FinsightConfig, LlmConfig, ProviderKind};
pub use reply::{ExpenseRecord, FailureKind, FraudAssessment, ReplyError, RiskLevel, StockOutlook};
pub use report::{AnalysisReport, ExtractionResult};
