//! CSV export of paper records.

use serde::Serialize;
use std::path::Path;

use crate::models::PaperRecord;
use crate::output::OutputError;

/// One CSV row; list fields are flattened into comma-joined text
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "PubmedID")]
    id: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Publication Date")]
    publication_date: &'a str,
    #[serde(rename = "Non-academic Author(s)")]
    non_academic_authors: String,
    #[serde(rename = "Company Affiliation(s)")]
    company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    corresponding_email: &'a str,
}

impl<'a> From<&'a PaperRecord> for CsvRow<'a> {
    fn from(record: &'a PaperRecord) -> Self {
        Self {
            id: record.id.as_str(),
            title: &record.title,
            publication_date: &record.publication_date,
            non_academic_authors: record.joined_authors(),
            company_affiliations: record.joined_affiliations(),
            corresponding_email: record.email_or_na(),
        }
    }
}

/// Write records to `path`, replacing any existing file
///
/// Every field is quoted. The parent directory is created when missing. An
/// empty slice writes nothing and only logs a warning. Returns the number of
/// data rows written.
#[tracing::instrument(name = "output.write_csv", skip(records, path), fields(path = %path.display(), records = records.len()))]
pub fn write_csv(records: &[PaperRecord], path: &Path) -> Result<usize, OutputError> {
    if records.is_empty() {
        tracing::warn!("No papers found. CSV file was not created.");
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)?;

    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    tracing::info!("Results successfully saved to: {}", path.display());

    Ok(records.len())
}
