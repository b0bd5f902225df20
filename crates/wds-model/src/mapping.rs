use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed source row, keyed by header name.
pub type Record = BTreeMap<String, String>;

/// One source-column to destination-column assignment. The lookup pair is
/// set only on synthesized fact entries, pointing back at the dimension
/// table and the destination column the dimension row is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    #[serde(rename = "excelColumn")]
    pub source_column: String,
    #[serde(rename = "dbColumn")]
    pub destination_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_column: Option<String>,
}

impl MappingEntry {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source_column: source.into(),
            destination_column: destination.into(),
            lookup_table: None,
            lookup_column: None,
        }
    }
}

/// A saved per-table snapshot: the accumulated mapping plus the full row
/// set destined for that table. Replaced wholesale when the user saves a
/// mapping for the same table name again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub table: String,
    pub mapping: Vec<MappingEntry>,
    pub rows: Vec<Record>,
    /// ISO 8601 timestamp of the save, for session display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}
