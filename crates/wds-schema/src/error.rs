use thiserror::Error;

use wds_model::TableKey;

/// Precondition failures from graph edit operations. Each carries the
/// user-facing text the front end surfaces as a notification; the graph
/// itself is untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("no table with key {0}")]
    UnknownTable(TableKey),
    #[error("no relation at index {0}")]
    UnknownRelation(usize),
    #[error("a table named '{0}' already exists")]
    DuplicateTableName(String),
    #[error("table name must not be empty")]
    EmptyTableName,
    #[error("cannot remove the attribute: table '{0}' must keep at least one column")]
    MinimumColumns(String),
    #[error("'{0}' is not a valid reference table")]
    InvalidReference(String),
    #[error("no other table is available to reference")]
    NoReferenceCandidates,
}

pub type Result<T> = std::result::Result<T, SchemaError>;
