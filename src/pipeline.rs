//! Search-then-fetch orchestration.
//!
//! Detail lookups run one at a time in search-result order. The first
//! failure aborts the run; no partial batch is returned.

use std::path::{Path, PathBuf};

use crate::models::{PaperRecord, SearchQuery};
use crate::output::{self, OutputError};
use crate::sources::{PubMedClient, SourceError};

/// Errors surfaced at the orchestration boundary
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to save results: {0}")]
    Output(#[from] OutputError),
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Records in search-result order
    pub records: Vec<PaperRecord>,

    /// CSV path, when a file was written
    pub written_to: Option<PathBuf>,
}

/// Search PubMed and fetch the record for every returned id
pub async fn fetch_records(
    client: &PubMedClient,
    query: &SearchQuery,
) -> Result<Vec<PaperRecord>, SourceError> {
    let ids = client.fetch_ids(query).await?;

    let mut records = Vec::with_capacity(ids.len());
    for id in &ids {
        records.push(client.fetch_details(id).await?);
    }

    Ok(records)
}

/// Fetch records and persist them to `output_path`
pub async fn run(
    client: &PubMedClient,
    query: &SearchQuery,
    output_path: &Path,
) -> Result<RunSummary, PipelineError> {
    let records = fetch_records(client, query).await?;
    let written = output::write_csv(&records, output_path)?;

    Ok(RunSummary {
        written_to: (written > 0).then(|| output_path.to_path_buf()),
        records,
    })
}
