//! Utility modules supporting the PubMed client.
//!
//! - [`HttpClient`]: shared reqwest client with the crate user agent and timeouts

mod http;

pub use http::{HttpClient, USER_AGENT};
