use serde::{Deserialize, Serialize};

/// A financial statement category and the terms recognized for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTerms {
    pub name: String,
    /// Terms in match priority order (earlier alternatives win at the same position).
    pub terms: Vec<String>,
}

impl CategoryTerms {
    pub fn new(name: &str, terms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Ordered set of categories scanned by the term extractor.
///
/// Serialized as a plain array so TOML configs can use `[[extraction.catalog]]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryCatalog {
    categories: Vec<CategoryTerms>,
}

impl CategoryCatalog {
    pub fn new(categories: Vec<CategoryTerms>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[CategoryTerms] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&CategoryTerms> {
        self.categories.iter().find(|c| c.name == name)
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::new(vec![
            CategoryTerms::new(
                "income_statement",
                &["revenue", "gross profit", "operating income", "net income"],
            ),
            CategoryTerms::new(
                "balance_sheet",
                &["assets", "liabilities", "equity", "debt"],
            ),
            CategoryTerms::new(
                "cash_flow",
                &[
                    "operating cash flow",
                    "investing cash flow",
                    "financing cash flow",
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_three_statements() {
        let catalog = CategoryCatalog::default();
        let names: Vec<&str> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["income_statement", "balance_sheet", "cash_flow"]);
        assert_eq!(catalog.get("balance_sheet").unwrap().terms.len(), 4);
        assert!(catalog.get("unknown").is_none());
    }

    #[test]
    fn catalog_serializes_as_array() {
        let catalog = CategoryCatalog::new(vec![CategoryTerms::new("custom", &["ebitda"])]);
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"name": "custom", "terms": ["ebitda"]}])
        );
    }
}
