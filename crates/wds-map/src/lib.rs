//! Column-mapping workflow tying parsed source files to warehouse tables.
//!
//! The entry point is [`MappingSession`]: load a source file, select a
//! destination table, assign source columns to destination columns, save
//! per-table snapshots, and submit dimension and fact rows through a
//! [`wds_backend::BackendClient`]. Payload builders are pure so callers
//! can inspect exactly what would be sent.

mod error;
mod fact;
mod session;

pub use error::{MapError, Result};
pub use session::{DimensionOutcome, MappingSession};
