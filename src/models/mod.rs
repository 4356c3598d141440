//! Core data models for PubMed searches and paper records.

mod paper;
mod search;

pub use paper::{PaperId, PaperRecord, PaperRecordBuilder, EMAIL_NOT_AVAILABLE};
pub use search::{SearchQuery, DEFAULT_MAX_RESULTS};
