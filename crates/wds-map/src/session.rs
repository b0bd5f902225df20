//! Mapping session state.
//!
//! One session covers the whole per-database mapping workflow: load a
//! source file, pick a destination table, accumulate mapping entries,
//! save per-table snapshots, and submit dimensions. The state lives for
//! the duration of the view and is never persisted across sessions by
//! the model itself (the front end may serialize it).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use wds_backend::BackendClient;
use wds_ingest::SourceData;
use wds_model::{DimensionInsert, MappingEntry, Record, TableData};

use crate::error::{MapError, Result};

/// Result of a successful dimension send.
#[derive(Debug, Clone)]
pub struct DimensionOutcome {
    /// Table the rows were inserted into.
    pub table: String,
    /// Raw backend response.
    pub response: Value,
    /// Whether the last source file was reloaded for the next dimension.
    pub reloaded: bool,
}

/// Working state of the column-mapping workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingSession {
    database_name: String,
    /// Destination tables known to exist in the target database.
    destination_tables: Vec<String>,
    selected_table: Option<String>,
    /// Currently loaded source file, if any.
    source: Option<SourceData>,
    /// Pristine copy of the originally parsed rows. Submissions read from
    /// this when the working rows have been cleared or reshaped.
    backup_rows: Vec<Record>,
    /// Working mapping for the selected table.
    working: Vec<MappingEntry>,
    /// Saved per-table snapshots, in save order. At most one per name.
    saved: Vec<TableData>,
    last_path: Option<PathBuf>,
}

impl MappingSession {
    pub fn new(database_name: impl Into<String>, destination_tables: Vec<String>) -> Self {
        Self {
            database_name: database_name.into(),
            destination_tables,
            ..Self::default()
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn destination_tables(&self) -> &[String] {
        &self.destination_tables
    }

    /// Replace the known destination tables (e.g. after re-fetching them).
    pub fn set_destination_tables(&mut self, tables: Vec<String>) {
        self.destination_tables = tables;
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.selected_table.as_deref()
    }

    pub fn source(&self) -> Option<&SourceData> {
        self.source.as_ref()
    }

    pub fn working_mapping(&self) -> &[MappingEntry] {
        &self.working
    }

    pub fn saved(&self) -> &[TableData] {
        &self.saved
    }

    pub fn backup_rows(&self) -> &[Record] {
        &self.backup_rows
    }

    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn restore_saved_for_tests(&mut self, saved: Vec<TableData>) {
        self.saved = saved;
    }

    #[cfg(test)]
    pub(crate) fn restore_backup_rows_for_tests(&mut self, rows: Vec<Record>) {
        self.backup_rows = rows;
    }

    /// Choose the destination table the working mapping targets.
    pub fn select_table(&mut self, name: &str) -> Result<()> {
        if !self.destination_tables.iter().any(|t| t == name) {
            return Err(MapError::UnknownDestinationTable(name.to_string()));
        }
        self.selected_table = Some(name.to_string());
        Ok(())
    }

    /// Parse a source file and make it the working data. The parsed rows
    /// are also kept as a pristine backup for later fact submission.
    pub fn load_file(&mut self, path: &Path) -> Result<&SourceData> {
        let source = wds_ingest::load_source(path)?;
        self.backup_rows = source.records.clone();
        self.last_path = Some(path.to_path_buf());
        Ok(self.source.insert(source))
    }

    /// Re-run the load against the last-selected file.
    pub fn reload_file(&mut self) -> Result<&SourceData> {
        let path = self.last_path.clone().ok_or(MapError::NoFileLoaded)?;
        self.load_file(&path)
    }

    /// Assign a source column to a destination column. The destination is
    /// the uniqueness key: a second assignment to the same destination
    /// overwrites the earlier one.
    pub fn assign(&mut self, source_column: &str, destination_column: &str) -> Result<()> {
        if self.selected_table.is_none() {
            return Err(MapError::NoTableSelected);
        }
        match self
            .working
            .iter_mut()
            .find(|e| e.destination_column == destination_column)
        {
            Some(entry) => entry.source_column = source_column.to_string(),
            None => self
                .working
                .push(MappingEntry::new(source_column, destination_column)),
        }
        Ok(())
    }

    /// Save the working mapping and current rows for the selected table,
    /// replacing any earlier snapshot with the same name. Clears the
    /// working mapping; the loaded data stays for the next table.
    pub fn save_mapping(&mut self) -> Result<String> {
        let table = self.validated_table()?;
        let rows = self.validated_rows()?.to_vec();
        let snapshot = TableData {
            table: table.clone(),
            mapping: std::mem::take(&mut self.working),
            rows,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        match self.saved.iter().position(|t| t.table == table) {
            Some(idx) => self.saved[idx] = snapshot,
            None => self.saved.push(snapshot),
        }
        info!(table = %table, "saved mapping");
        Ok(table)
    }

    /// Build the dimension-insert body for the current state without
    /// mutating anything. Fails on the same preconditions as saving.
    pub fn dimension_payload(&self) -> Result<DimensionInsert> {
        let table = self.validated_table()?;
        let data = self.validated_rows()?.to_vec();
        Ok(DimensionInsert {
            database_name: self.database_name.clone(),
            table,
            mapping: self.working.clone(),
            data,
        })
    }

    /// Save and submit the current mapping as dimension rows. On success
    /// the selection clears and the last source file is reloaded so the
    /// next dimension can be mapped from the same upload; reload failure
    /// is only a warning. On submit failure nothing further changes.
    pub fn send_dimension(&mut self, client: &BackendClient) -> Result<DimensionOutcome> {
        let payload = self.dimension_payload()?;
        let table = self.save_mapping()?;
        let response = client.insert_dimension(&payload)?;
        self.selected_table = None;
        let reloaded = match self.reload_file() {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "reload after dimension send failed");
                false
            }
        };
        Ok(DimensionOutcome {
            table,
            response,
            reloaded,
        })
    }

    fn validated_table(&self) -> Result<String> {
        let table = self
            .selected_table
            .clone()
            .ok_or(MapError::NoTableSelected)?;
        if self.working.is_empty() {
            return Err(MapError::EmptyMapping(table));
        }
        Ok(table)
    }

    fn validated_rows(&self) -> Result<&[Record]> {
        let source = self.source.as_ref().ok_or(MapError::NoFileLoaded)?;
        if source.records.is_empty() {
            return Err(MapError::EmptyData);
        }
        Ok(&source.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn sample_session() -> MappingSession {
        MappingSession::new(
            "MyDatabase",
            vec![
                "Customer".to_string(),
                "Product".to_string(),
                "FactSales".to_string(),
            ],
        )
    }

    fn load_sample(session: &mut MappingSession) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"cust_id,cust_name\n1,alice\n2,bob\n").unwrap();
        session.load_file(&path).unwrap();
        dir
    }

    #[test]
    fn reload_before_any_load_is_refused() {
        let mut session = sample_session();
        assert!(matches!(session.reload_file(), Err(MapError::NoFileLoaded)));
        assert!(session.source().is_none());
        assert!(session.last_path().is_none());
    }

    #[test]
    fn reload_reuses_last_path() {
        let mut session = sample_session();
        let _dir = load_sample(&mut session);
        let records = session.reload_file().unwrap().records.len();
        assert_eq!(records, 2);
    }

    #[test]
    fn select_table_rejects_unknown_names() {
        let mut session = sample_session();
        assert!(matches!(
            session.select_table("Nope"),
            Err(MapError::UnknownDestinationTable(_))
        ));
        assert!(session.select_table("Customer").is_ok());
    }

    #[test]
    fn assign_requires_a_selected_table() {
        let mut session = sample_session();
        assert!(matches!(
            session.assign("cust_id", "id"),
            Err(MapError::NoTableSelected)
        ));
    }

    #[test]
    fn assign_overwrites_by_destination_column() {
        let mut session = sample_session();
        session.select_table("Customer").unwrap();
        session.assign("cust_id", "id").unwrap();
        session.assign("cust_name", "id").unwrap();
        assert_eq!(session.working_mapping().len(), 1);
        assert_eq!(session.working_mapping()[0].source_column, "cust_name");
        assert_eq!(session.working_mapping()[0].destination_column, "id");
    }

    #[test]
    fn save_requires_mapping_and_data() {
        let mut session = sample_session();
        session.select_table("Customer").unwrap();
        assert!(matches!(
            session.save_mapping(),
            Err(MapError::EmptyMapping(_))
        ));
        session.assign("cust_id", "id").unwrap();
        assert!(matches!(session.save_mapping(), Err(MapError::NoFileLoaded)));
    }

    #[test]
    fn save_replaces_earlier_snapshot_and_clears_working() {
        let mut session = sample_session();
        let _dir = load_sample(&mut session);
        session.select_table("Customer").unwrap();
        session.assign("cust_id", "id").unwrap();
        session.save_mapping().unwrap();
        assert!(session.working_mapping().is_empty());
        assert_eq!(session.saved().len(), 1);
        assert_eq!(session.saved()[0].rows.len(), 2);

        session.select_table("Customer").unwrap();
        session.assign("cust_name", "name").unwrap();
        session.save_mapping().unwrap();
        assert_eq!(session.saved().len(), 1);
        assert_eq!(session.saved()[0].mapping[0].destination_column, "name");
    }

    #[test]
    fn loaded_data_survives_a_save() {
        let mut session = sample_session();
        let _dir = load_sample(&mut session);
        session.select_table("Customer").unwrap();
        session.assign("cust_id", "id").unwrap();
        session.save_mapping().unwrap();
        assert_eq!(session.source().unwrap().records.len(), 2);
    }

    #[test]
    fn dimension_payload_snapshots_current_state() {
        let mut session = sample_session();
        let _dir = load_sample(&mut session);
        session.select_table("Customer").unwrap();
        session.assign("cust_id", "id").unwrap();
        let payload = session.dimension_payload().unwrap();
        assert_eq!(payload.database_name, "MyDatabase");
        assert_eq!(payload.table, "Customer");
        assert_eq!(payload.mapping.len(), 1);
        assert_eq!(payload.data.len(), 2);
        // Building the payload does not consume the working mapping.
        assert_eq!(session.working_mapping().len(), 1);
    }

    proptest! {
        #[test]
        fn at_most_one_entry_per_destination(
            assignments in proptest::collection::vec(("[a-d]", "[x-z]"), 1..20)
        ) {
            let mut session = sample_session();
            session.select_table("Customer").unwrap();
            for (src, dst) in &assignments {
                session.assign(src, dst).unwrap();
            }
            let mut destinations: Vec<&str> = session
                .working_mapping()
                .iter()
                .map(|e| e.destination_column.as_str())
                .collect();
            destinations.sort_unstable();
            let before = destinations.len();
            destinations.dedup();
            prop_assert_eq!(before, destinations.len());

            // Each destination holds the most recent source assigned to it.
            for entry in session.working_mapping() {
                let last = assignments
                    .iter()
                    .rev()
                    .find(|(_, dst)| dst == &entry.destination_column)
                    .map(|(src, _)| src.clone());
                prop_assert_eq!(last, Some(entry.source_column.clone()));
            }
        }
    }
}
