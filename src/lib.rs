//! # PubMed Fetch
//!
//! Search PubMed by keyword, fetch per-paper metadata and export it as CSV.
//!
//! ## Architecture
//!
//! - [`models`]: Core data structures (SearchQuery, PaperId, PaperRecord)
//! - [`sources`]: PubMed E-utilities client and its error type
//! - [`output`]: CSV writer and console table renderer
//! - [`pipeline`]: search-then-fetch orchestration
//! - [`utils`]: HTTP client
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{PaperId, PaperRecord, SearchQuery};
pub use sources::{PubMedClient, SourceError};
