//! PubMed E-utilities client and the errors it can produce.
//!
//! [`PubMedClient`] wraps the two endpoints used by the tool:
//!
//! - `esearch.fcgi` resolves a free-text query into an ordered list of PMIDs
//!   ([`PubMedClient::fetch_ids`])
//! - `efetch.fcgi` returns the XML record for one PMID, from which the title
//!   and publication year are extracted ([`PubMedClient::fetch_details`])
//!
//! Requests are never retried; any failure is returned to the caller.

mod pubmed;

pub use pubmed::PubMedClient;

/// Errors that can occur when talking to PubMed
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The endpoint answered with a non-success HTTP status
    #[error("PubMed returned HTTP {status} for {url}")]
    Transport { status: u16, url: String },

    /// Connection, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body is not valid JSON/XML
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SourceError {
    /// HTTP status for transport errors
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Decode(format!("XML: {}", err))
    }
}
