pub mod column;
pub mod error;
pub mod export;
pub mod mapping;
pub mod requests;
pub mod schema;

pub use column::{Column, ColumnType};
pub use error::{ModelError, Result};
pub use export::{ExportedColumn, ExportedRelation, ExportedTable, SchemaExport};
pub use mapping::{MappingEntry, Record, TableData};
pub use requests::{ChatMessage, DimensionInsert, FactInsert, TrainRequest};
pub use schema::{RelationLink, TableKey, TableNode};
