//! Paper identifiers and the flat per-paper record written to CSV.

use serde::{Deserialize, Serialize};

/// Placeholder used when a paper has no corresponding author email
pub const EMAIL_NOT_AVAILABLE: &str = "N/A";

/// Opaque PubMed identifier (PMID)
///
/// Identifiers are kept exactly as the search endpoint returned them; the
/// order of a result list is significant for output ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(String);

impl PaperId {
    /// Wrap a raw identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (never true for ids produced by the client)
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for PaperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PaperId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PaperId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PaperId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Metadata for a single paper
///
/// Every field except the identifier degrades to an empty value when the
/// upstream document lacks it. The author, affiliation and email fields are
/// part of the output schema but are not extracted from PubMed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// PubMed identifier
    pub id: PaperId,

    /// Article title (empty when absent)
    pub title: String,

    /// Publication year (empty when absent)
    pub publication_date: String,

    /// Authors without an academic affiliation
    pub non_academic_authors: Vec<String>,

    /// Company affiliations of those authors
    pub company_affiliations: Vec<String>,

    /// Corresponding author email
    pub corresponding_email: Option<String>,
}

impl PaperRecord {
    /// Create a record with only the identifier set
    pub fn new(id: PaperId) -> Self {
        Self {
            id,
            title: String::new(),
            publication_date: String::new(),
            non_academic_authors: Vec::new(),
            company_affiliations: Vec::new(),
            corresponding_email: None,
        }
    }

    /// Authors joined into a single column value
    pub fn joined_authors(&self) -> String {
        self.non_academic_authors.join(", ")
    }

    /// Affiliations joined into a single column value
    pub fn joined_affiliations(&self) -> String {
        self.company_affiliations.join(", ")
    }

    /// Email, or `N/A` when there is none
    pub fn email_or_na(&self) -> &str {
        self.corresponding_email
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(EMAIL_NOT_AVAILABLE)
    }
}

/// Builder for constructing PaperRecord objects
#[derive(Debug, Clone)]
pub struct PaperRecordBuilder {
    record: PaperRecord,
}

impl PaperRecordBuilder {
    /// Create a new builder for the given identifier
    pub fn new(id: impl Into<PaperId>) -> Self {
        Self {
            record: PaperRecord::new(id.into()),
        }
    }

    /// Set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.record.title = title.into();
        self
    }

    /// Set publication date
    pub fn publication_date(mut self, date: impl Into<String>) -> Self {
        self.record.publication_date = date.into();
        self
    }

    /// Set non-academic authors
    pub fn non_academic_authors(mut self, authors: Vec<String>) -> Self {
        self.record.non_academic_authors = authors;
        self
    }

    /// Set company affiliations
    pub fn company_affiliations(mut self, affiliations: Vec<String>) -> Self {
        self.record.company_affiliations = affiliations;
        self
    }

    /// Set corresponding author email
    pub fn corresponding_email(mut self, email: impl Into<String>) -> Self {
        self.record.corresponding_email = Some(email.into());
        self
    }

    /// Build the PaperRecord
    pub fn build(self) -> PaperRecord {
        self.record
    }
}
