//! Shared CLI components for the warehouse designer.

pub mod logging;
