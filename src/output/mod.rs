//! Result output: CSV files and console tables.

mod csv_export;
mod table;

pub use csv_export::write_csv;
pub use table::{render_table, TABLE_HEADERS};

/// Errors that can occur while persisting results
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Filesystem error (directory creation, file write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
