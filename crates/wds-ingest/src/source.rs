use std::path::Path;

use serde::{Deserialize, Serialize};

use wds_model::Record;

use crate::error::{IngestError, Result};

/// A parsed source file: ordered header names plus every data row keyed
/// by header. Rows whose cells are all empty are dropped during parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceData {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl SourceData {
    /// How many records the preview shows.
    pub const PREVIEW_ROWS: usize = 5;

    /// The first few records, for display before mapping.
    pub fn preview(&self) -> &[Record] {
        let end = self.records.len().min(Self::PREVIEW_ROWS);
        &self.records[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turn raw rows into a [`SourceData`]: first row is the header, columns
/// with blank header names are dropped, missing cells become empty
/// strings, all-empty rows are skipped.
pub(crate) fn rows_to_source(rows: Vec<Vec<String>>, path: &Path) -> Result<SourceData> {
    let mut iter = rows.into_iter();
    let header_row = iter
        .next()
        .ok_or_else(|| IngestError::EmptySource(path.display().to_string()))?;
    let headers: Vec<String> = header_row.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::EmptySource(path.display().to_string()));
    }

    let mut records = Vec::new();
    for row in iter {
        let mut record = Record::new();
        let mut any_value = false;
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = row
                .get(idx)
                .map(|v| v.trim().to_string())
                .unwrap_or_default();
            if !value.is_empty() {
                any_value = true;
            }
            record.insert(header.clone(), value);
        }
        if any_value {
            records.push(record);
        }
    }

    let columns = headers.into_iter().filter(|h| !h.is_empty()).collect();
    Ok(SourceData { columns, records })
}
