use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a structured use-case produced no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureKind {
    /// Every backend attempt failed.
    Transport,
    /// The model replied, but not with decodable JSON.
    #[default]
    Decode,
    /// The caller's input was unusable; no request was sent.
    InvalidInput,
    /// The request was cancelled before a reply arrived.
    Cancelled,
}

/// Uniform failure value for the structured use-cases.
///
/// Serializes to `{"error": "<message>"}` regardless of `kind`, so a
/// presentation layer can render every failure the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{error}")]
pub struct ReplyError {
    #[serde(skip)]
    pub kind: FailureKind,
    pub error: String,
}

impl ReplyError {
    pub fn new(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.error })
    }
}

/// Typed view of a stock outlook reply. Missing fields default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StockOutlook {
    pub current_analysis: CurrentAnalysis,
    pub predictions: Predictions,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurrentAnalysis {
    pub valuation: String,
    pub technical_analysis: String,
    pub fundamentals: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Predictions {
    #[serde(rename = "1_week")]
    pub one_week: String,
    #[serde(rename = "1_month")]
    pub one_month: String,
    #[serde(rename = "1_year")]
    pub one_year: String,
}

/// Typed view of an expense categorization reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpenseRecord {
    pub vendor: String,
    /// Expected as `YYYY-MM-DD`; kept verbatim since models do not always comply.
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub tax_details: TaxDetails,
}

impl ExpenseRecord {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaxDetails {
    pub gst: f64,
    pub total_tax: f64,
}

/// Risk level reported by the fraud scan. Anything unrecognized is `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.as_str().to_string()
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view of a fraud risk reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FraudAssessment {
    pub risk_level: RiskLevel,
    pub suspicious_patterns: Vec<String>,
    pub recommended_actions: Vec<String>,
}

macro_rules! impl_from_reply {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Read this view out of a decoded reply.
                pub fn from_reply(reply: &serde_json::Value) -> Result<Self, serde_json::Error> {
                    serde_json::from_value(reply.clone())
                }
            }
        )*
    };
}

impl_from_reply!(StockOutlook, ExpenseRecord, FraudAssessment);
