use std::collections::BTreeMap;

use finsight_models::{CategoryCatalog, DuplicatePolicy, ExtractionResult};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("amount {token:?} for '{term}' in {category} is not a number")]
    InvalidAmount {
        category: String,
        term: String,
        token: String,
    },

    #[error("invalid pattern for category {category}: {source}")]
    Pattern {
        category: String,
        #[source]
        source: regex::Error,
    },
}

/// Scans document text for catalog terms followed by a currency amount.
pub struct TermExtractor {
    patterns: Vec<CategoryPattern>,
    duplicate_policy: DuplicatePolicy,
}

struct CategoryPattern {
    category: String,
    regex: Regex,
}

impl TermExtractor {
    /// Compile one case-insensitive alternation per category.
    /// Categories with no terms are skipped.
    pub fn new(
        catalog: &CategoryCatalog,
        duplicate_policy: DuplicatePolicy,
    ) -> Result<Self, ExtractionError> {
        let mut patterns = Vec::new();

        for category in catalog.categories() {
            if category.terms.is_empty() {
                continue;
            }

            let alternation = category
                .terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");

            // Amount: optional "$" and space, then digits with commas and dot
            // groups. A token always holds a digit; a dot joins it only when a
            // digit follows.
            let pattern = format!(
                r"(?i)({alternation}):?\s*(\$?\s?(?:\d[\d,]*(?:\.\d+)*|\.\d+))"
            );
            let regex = Regex::new(&pattern).map_err(|source| ExtractionError::Pattern {
                category: category.name.clone(),
                source,
            })?;

            patterns.push(CategoryPattern {
                category: category.name.clone(),
                regex,
            });
        }

        Ok(Self {
            patterns,
            duplicate_policy,
        })
    }

    pub fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractionError> {
        let mut findings = ExtractionResult::new();

        for pattern in &self.patterns {
            let mut terms: BTreeMap<String, f64> = BTreeMap::new();

            for caps in pattern.regex.captures_iter(text) {
                let (Some(term), Some(token)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let term = term.as_str().to_lowercase();
                let amount =
                    parse_amount(token.as_str()).ok_or_else(|| ExtractionError::InvalidAmount {
                        category: pattern.category.clone(),
                        term: term.clone(),
                        token: token.as_str().to_string(),
                    })?;

                match self.duplicate_policy {
                    DuplicatePolicy::First => {
                        terms.entry(term).or_insert(amount);
                    }
                    DuplicatePolicy::Last => {
                        terms.insert(term, amount);
                    }
                }
            }

            if !terms.is_empty() {
                debug!(category = %pattern.category, matched = terms.len(), "Extracted terms");
                findings.insert(pattern.category.clone(), terms);
            }
        }

        Ok(findings)
    }
}

/// Keep only digits and '.', then parse. `None` when no digit survives or
/// the rest is not a number (e.g. "1.234.567").
fn parse_amount(token: &str) -> Option<f64> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}
