//! Search request model.

use serde::{Deserialize, Serialize};

/// Default cap on the number of identifiers requested from the search endpoint
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Search query parameters
///
/// Built once and not modified afterwards; the builder-style setters consume
/// the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search term, passed to PubMed unchanged
    pub query: String,

    /// Maximum number of identifiers to return (always at least 1)
    pub max_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results (zero is raised to one)
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max.max(1);
        self
    }

    /// Whether the query text is blank
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// File stem used for the default CSV name: spaces become underscores
    pub fn file_stem(&self) -> String {
        self.query.replace(' ', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_max_results() {
        let query = SearchQuery::new("cancer");
        assert_eq!(query.query, "cancer");
        assert_eq!(query.max_results, 10);
    }

    #[test]
    fn test_max_results_is_positive() {
        assert_eq!(SearchQuery::new("x").max_results(0).max_results, 1);
        assert_eq!(SearchQuery::new("x").max_results(5).max_results, 5);
    }

    #[test]
    fn test_blank_query() {
        assert!(SearchQuery::new("   ").is_blank());
        assert!(!SearchQuery::new("gene therapy").is_blank());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(SearchQuery::new("gene therapy trials").file_stem(), "gene_therapy_trials");
    }
}
