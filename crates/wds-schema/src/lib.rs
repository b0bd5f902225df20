//! In-memory schema graph for the warehouse designer.
//!
//! The graph is an arena of table nodes and relation links keyed by
//! integer id, decoupled from any rendering concern. A presentation layer
//! relays user gestures into the edit operations here; every successful
//! mutation lands in an append-only command log that backs undo.

pub mod command;
pub mod error;
pub mod export;
pub mod graph;

pub use command::Command;
pub use error::{Result, SchemaError};
pub use export::export_schema;
pub use graph::{AttributeOutcome, ForeignKeyPrompt, KeyKind, SchemaGraph};
