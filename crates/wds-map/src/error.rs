use thiserror::Error;

use wds_backend::BackendError;
use wds_ingest::IngestError;

/// Validation and workflow errors. Validation variants abort before any
/// network call and carry the text the front end shows as a notification.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapError {
    #[error("select a destination table first")]
    NoTableSelected,
    #[error("'{0}' is not a known destination table")]
    UnknownDestinationTable(String),
    #[error("no source file has been loaded yet")]
    NoFileLoaded,
    #[error("the mapping for '{0}' is empty")]
    EmptyMapping(String),
    #[error("the loaded data set is empty")]
    EmptyData,
    #[error("no destination table name starts with 'fact'")]
    NoFactTable,
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, MapError>;
