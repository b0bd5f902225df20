use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported file extension: '{0}'")]
    UnsupportedExtension(String),
    #[error("source file has no header row: {0}")]
    EmptySource(String),
    #[error("workbook error: {0}")]
    Workbook(String),
    #[error("XML parse error: {0}")]
    Xml(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
