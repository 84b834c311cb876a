use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category name -> lower-cased matched term -> parsed amount.
///
/// Categories without a match are absent rather than empty.
pub type ExtractionResult = BTreeMap<String, BTreeMap<String, f64>>;

/// Output of the document analysis use-case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub structured_data: ExtractionResult,
    /// Free-form markdown from the model, shown as-is. Holds the
    /// unavailability sentinel when every attempt failed.
    pub ai_analysis: String,
}
