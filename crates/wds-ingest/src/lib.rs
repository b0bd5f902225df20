//! Source-file ingestion for the mapping workflow.
//!
//! Accepts delimited text (comma, semicolon, or tab, sniffed from the
//! header line) and XLSX workbooks (first worksheet). Both produce a
//! [`SourceData`]: the ordered header list plus every data row keyed by
//! header name.

pub mod delimited;
pub mod error;
pub mod source;
pub mod xlsx;

use std::path::Path;

use tracing::info;

pub use error::{IngestError, Result};
pub use source::SourceData;

/// Load a source file, dispatching on its extension.
pub fn load_source(path: &Path) -> Result<SourceData> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let source = match extension.as_str() {
        "csv" | "tsv" | "txt" => delimited::load(path)?,
        "xlsx" => xlsx::load(path)?,
        _ => return Err(IngestError::UnsupportedExtension(extension)),
    };
    info!(
        path = %path.display(),
        columns = source.columns.len(),
        records = source.records.len(),
        "loaded source file"
    );
    Ok(source)
}
