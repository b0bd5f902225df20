//! Fact-table submission.
//!
//! Facts go last: by the time a fact is sent, each dimension has a saved
//! snapshot, and the fact mapping can be synthesized from them. Every
//! saved dimension contributes one lookup entry tying a source column to
//! the dimension's key column.

use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

use wds_backend::BackendClient;
use wds_model::{FactInsert, MappingEntry, TableData};

use crate::error::{MapError, Result};
use crate::session::MappingSession;

impl MappingSession {
    /// Destination table the fact submission targets: the first table
    /// whose name starts with "fact", case-insensitively.
    pub fn fact_table(&self) -> Option<&str> {
        self.destination_tables()
            .iter()
            .map(String::as_str)
            .find(|t| t.to_lowercase().starts_with("fact"))
    }

    /// Synthesize a fact mapping from the saved dimension snapshots.
    ///
    /// Each distinct dimension (compared case-insensitively, first save
    /// wins) yields one entry. The source column comes from the
    /// dimension's own mapping, preferring the first entry whose
    /// destination contains "id"; the destination is `<dimension>_id`
    /// in lowercase, and the lookup pair names the dimension table and
    /// the column the chosen entry mapped to.
    pub fn auto_fact_mapping(&self) -> Vec<MappingEntry> {
        let mut seen = HashSet::new();
        let mut mapping = Vec::new();
        for snapshot in self.saved() {
            let lowered = snapshot.table.to_lowercase();
            if lowered.starts_with("fact") || !seen.insert(lowered.clone()) {
                continue;
            }
            let Some(chosen) = snapshot
                .mapping
                .iter()
                .find(|e| e.destination_column.to_lowercase().contains("id"))
                .or_else(|| snapshot.mapping.first())
            else {
                continue;
            };
            mapping.push(MappingEntry {
                source_column: chosen.source_column.clone(),
                destination_column: format!("{lowered}_id"),
                lookup_table: Some(snapshot.table.clone()),
                lookup_column: Some(chosen.destination_column.clone()),
            });
        }
        mapping
    }

    /// Build the insert-fact body. Uses the saved fact snapshot when one
    /// exists; otherwise synthesizes the mapping from the saved
    /// dimensions and pairs it with the originally parsed rows.
    pub fn fact_payload(&self) -> Result<FactInsert> {
        let fact_table = self.fact_table().ok_or(MapError::NoFactTable)?.to_string();
        let snapshot = match self.saved().iter().find(|t| t.table == fact_table) {
            Some(saved) => saved.clone(),
            None => TableData {
                table: fact_table.clone(),
                mapping: self.auto_fact_mapping(),
                rows: self.backup_rows().to_vec(),
                saved_at: None,
            },
        };
        if snapshot.rows.is_empty() {
            return Err(MapError::EmptyData);
        }
        Ok(FactInsert {
            database_name: self.database_name().to_string(),
            fact_table,
            mapping: snapshot.mapping,
            data: snapshot.rows,
        })
    }

    /// Submit the fact rows. Builds the payload first; any precondition
    /// failure aborts before anything is sent.
    pub fn send_fact(&self, client: &BackendClient) -> Result<Value> {
        let payload = self.fact_payload()?;
        let response = client.insert_fact(&payload)?;
        info!(table = %payload.fact_table, rows = payload.data.len(), "fact rows inserted");
        Ok(response)
    }
}
