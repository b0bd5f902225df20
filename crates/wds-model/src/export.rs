use serde::{Deserialize, Serialize};

use crate::column::ColumnType;

/// Model-class discriminator the backend expects on the create-database
/// body. Fixed for every export this designer produces.
pub const EXPORT_CLASS: &str = "GraphLinksModel";

/// Placeholder name emitted when a relation endpoint no longer resolves
/// to a table.
pub const UNKNOWN_TABLE: &str = "Unknown";

/// The normalized schema document submitted to the create-database
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaExport {
    pub database_name: String,
    pub class: String,
    pub tables: Vec<ExportedTable>,
    pub relations: Vec<ExportedRelation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTable {
    pub name: String,
    pub columns: Vec<ExportedColumn>,
}

/// A flattened column record. Unlike the in-memory `Column`, the flags are
/// always present and a missing reference table serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    pub primary_key: bool,
    pub foreign_key: bool,
    pub reference_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedRelation {
    pub from_table: String,
    pub to_table: String,
    pub relation_name: String,
}
