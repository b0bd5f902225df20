//! On-disk persistence for design and mapping state between invocations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wds_map::MappingSession;
use wds_schema::SchemaGraph;

/// A schema design in progress: the target database name plus the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFile {
    pub database_name: String,
    pub graph: SchemaGraph,
}

pub fn load_design(path: &Path) -> Result<DesignFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read design file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parse design file {}", path.display()))
}

pub fn save_design(path: &Path, design: &DesignFile) -> Result<()> {
    let text = serde_json::to_string_pretty(design).context("serialize design")?;
    fs::write(path, text).with_context(|| format!("write design file {}", path.display()))
}

pub fn load_session(path: &Path) -> Result<MappingSession> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read session file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parse session file {}", path.display()))
}

pub fn save_session(path: &Path, session: &MappingSession) -> Result<()> {
    let text = serde_json::to_string_pretty(session).context("serialize session")?;
    fs::write(path, text).with_context(|| format!("write session file {}", path.display()))
}
