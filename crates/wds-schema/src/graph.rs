use serde::{Deserialize, Serialize};
use tracing::debug;

use wds_model::{Column, ColumnType, RelationLink, TableKey, TableNode};

use crate::command::Command;
use crate::error::{Result, SchemaError};

/// Key-kind selected for a new attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyKind {
    #[default]
    None,
    Primary,
    Foreign,
}

/// A pending foreign-key attribute. Adding a foreign key needs a reference
/// table, so the operation pauses here and resumes through
/// [`SchemaGraph::complete_foreign_key`] once the caller has a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyPrompt {
    pub table: TableKey,
    /// Type the user originally picked; used when the reference table has
    /// no primary-key column to copy from.
    pub requested: ColumnType,
    /// Names of every other table, the valid choices.
    pub candidates: Vec<String>,
}

/// Result of [`SchemaGraph::add_attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOutcome {
    Added,
    NeedsReference(ForeignKeyPrompt),
}

/// Arena of table nodes and relation links. Keys come from a monotonic
/// counter so they stay unique across removals; table names are unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaGraph {
    nodes: Vec<TableNode>,
    links: Vec<RelationLink>,
    next_key: u32,
    #[serde(default)]
    log: Vec<Command>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[TableNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[RelationLink] {
        &self.links
    }

    pub fn table(&self, key: TableKey) -> Option<&TableNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&TableNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn node_mut(&mut self, key: TableKey) -> Result<&mut TableNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.key == key)
            .ok_or(SchemaError::UnknownTable(key))
    }

    /// Append a new table with a generated name and the default identity
    /// column. Returns the new table's key.
    pub fn add_table(&mut self) -> TableKey {
        self.next_key += 1;
        let key = TableKey(self.next_key);
        let mut name = format!("Table_{}", key.0);
        let mut suffix = 1;
        while self.table_by_name(&name).is_some() {
            suffix += 1;
            name = format!("Table_{}_{suffix}", key.0);
        }
        self.nodes.push(TableNode {
            key,
            name,
            columns: vec![Column::identity()],
        });
        self.log.push(Command::AddTable { key });
        debug!(%key, "added table");
        key
    }

    /// Rename a table, rejecting collisions with any other table name.
    pub fn rename_table(&mut self, key: TableKey, new_name: &str) -> Result<()> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(SchemaError::EmptyTableName);
        }
        if self.nodes.iter().any(|n| n.key != key && n.name == name) {
            return Err(SchemaError::DuplicateTableName(name.to_string()));
        }
        let previous = {
            let node = self.node_mut(key)?;
            if node.name == name {
                return Ok(());
            }
            std::mem::replace(&mut node.name, name.to_string())
        };
        self.log.push(Command::RenameTable { key, previous });
        Ok(())
    }

    /// Append a column of the chosen type to a table. A plain or
    /// primary-key attribute is added immediately; a foreign-key attribute
    /// needs a reference table and returns a prompt instead of mutating.
    pub fn add_attribute(
        &mut self,
        table: TableKey,
        ty: ColumnType,
        kind: KeyKind,
    ) -> Result<AttributeOutcome> {
        if self.table(table).is_none() {
            return Err(SchemaError::UnknownTable(table));
        }
        if kind == KeyKind::Foreign {
            let candidates: Vec<String> = self
                .nodes
                .iter()
                .filter(|n| n.key != table)
                .map(|n| n.name.clone())
                .collect();
            if candidates.is_empty() {
                return Err(SchemaError::NoReferenceCandidates);
            }
            return Ok(AttributeOutcome::NeedsReference(ForeignKeyPrompt {
                table,
                requested: ty,
                candidates,
            }));
        }
        let column = Column {
            primary_key: kind == KeyKind::Primary,
            ..Column::new("NewColumn", ty)
        };
        self.node_mut(table)?.columns.push(column);
        self.log.push(Command::AddColumn { table });
        Ok(AttributeOutcome::Added)
    }

    /// Resume a pending foreign-key attribute with the chosen reference
    /// table. An invalid choice aborts the whole attribute addition; the
    /// graph is untouched. On success the column is named
    /// `<reference>_id`, its type copies the reference's primary key, and
    /// a relation from the reference to the owning table is inserted.
    pub fn complete_foreign_key(&mut self, prompt: &ForeignKeyPrompt, choice: &str) -> Result<()> {
        let choice = choice.trim();
        if !prompt.candidates.iter().any(|c| c == choice) {
            return Err(SchemaError::InvalidReference(choice.to_string()));
        }
        let (ref_key, ty) = match self.table_by_name(choice) {
            Some(reference) => (
                reference.key,
                reference.primary_key().map_or(prompt.requested, |c| c.ty),
            ),
            None => return Err(SchemaError::InvalidReference(choice.to_string())),
        };
        let column = Column {
            foreign_key: true,
            reference_table: Some(choice.to_string()),
            ..Column::new(format!("{choice}_id"), ty)
        };
        self.node_mut(prompt.table)?.columns.push(column);
        self.links.push(RelationLink {
            from: ref_key,
            to: prompt.table,
            label: None,
        });
        self.log.push(Command::AddForeignKey {
            table: prompt.table,
            link_index: self.links.len() - 1,
        });
        debug!(table = %prompt.table, reference = choice, "added foreign key");
        Ok(())
    }

    /// Append a relation between two tables. A blank or missing label
    /// defaults to "Relation". Parallel links are permitted.
    pub fn add_relation(
        &mut self,
        from: TableKey,
        to: TableKey,
        label: Option<&str>,
    ) -> Result<()> {
        if self.table(from).is_none() {
            return Err(SchemaError::UnknownTable(from));
        }
        if self.table(to).is_none() {
            return Err(SchemaError::UnknownTable(to));
        }
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("Relation")
            .to_string();
        self.links.push(RelationLink {
            from,
            to,
            label: Some(label),
        });
        self.log.push(Command::AddRelation {
            index: self.links.len() - 1,
        });
        Ok(())
    }

    /// Remove a table, returning its name. Links pointing at it are kept;
    /// export resolves their dangling endpoints to a placeholder.
    pub fn remove_table(&mut self, key: TableKey) -> Result<String> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.key == key)
            .ok_or(SchemaError::UnknownTable(key))?;
        let node = self.nodes.remove(index);
        let name = node.name.clone();
        self.log.push(Command::RemoveTable { index, node });
        Ok(name)
    }

    /// Remove the relation at the given position in the link list.
    pub fn remove_relation(&mut self, index: usize) -> Result<RelationLink> {
        if index >= self.links.len() {
            return Err(SchemaError::UnknownRelation(index));
        }
        let link = self.links.remove(index);
        self.log.push(Command::RemoveRelation {
            index,
            link: link.clone(),
        });
        Ok(link)
    }

    /// Remove a table's most recently added column. Refused when only one
    /// column remains.
    pub fn remove_attribute(&mut self, key: TableKey) -> Result<Column> {
        let (name, column) = {
            let node = self.node_mut(key)?;
            if node.columns.len() <= 1 {
                return Err(SchemaError::MinimumColumns(node.name.clone()));
            }
            let name = node.name.clone();
            match node.columns.pop() {
                Some(column) => (name, column),
                None => return Err(SchemaError::MinimumColumns(name)),
            }
        };
        debug!(table = %name, column = %column.name, "removed attribute");
        self.log.push(Command::RemoveColumn {
            table: key,
            column: column.clone(),
        });
        Ok(column)
    }

    /// Revert the most recent edit, if any, and return it.
    pub fn undo(&mut self) -> Option<Command> {
        let command = self.log.pop()?;
        match &command {
            Command::AddTable { key } => {
                self.nodes.retain(|n| n.key != *key);
            }
            Command::RenameTable { key, previous } => {
                if let Some(node) = self.nodes.iter_mut().find(|n| n.key == *key) {
                    node.name = previous.clone();
                }
            }
            Command::AddColumn { table } => {
                if let Some(node) = self.nodes.iter_mut().find(|n| n.key == *table) {
                    node.columns.pop();
                }
            }
            Command::AddForeignKey { table, link_index } => {
                if let Some(node) = self.nodes.iter_mut().find(|n| n.key == *table) {
                    node.columns.pop();
                }
                if *link_index < self.links.len() {
                    self.links.remove(*link_index);
                }
            }
            Command::AddRelation { index } => {
                if *index < self.links.len() {
                    self.links.remove(*index);
                }
            }
            Command::RemoveTable { index, node } => {
                let at = (*index).min(self.nodes.len());
                self.nodes.insert(at, node.clone());
            }
            Command::RemoveRelation { index, link } => {
                let at = (*index).min(self.links.len());
                self.links.insert(at, link.clone());
            }
            Command::RemoveColumn { table, column } => {
                if let Some(node) = self.nodes.iter_mut().find(|n| n.key == *table) {
                    node.columns.push(column.clone());
                }
            }
        }
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wds_model::ColumnType;

    #[test]
    fn table_keys_increase_from_one() {
        let mut graph = SchemaGraph::new();
        let keys: Vec<u32> = (0..5).map(|_| graph.add_table().0).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn keys_stay_unique_after_removal() {
        let mut graph = SchemaGraph::new();
        let first = graph.add_table();
        let second = graph.add_table();
        graph.remove_table(second).unwrap();
        let third = graph.add_table();
        assert_ne!(third, first);
        assert_ne!(third, second);
    }

    #[test]
    fn new_table_has_identity_primary_key() {
        let mut graph = SchemaGraph::new();
        let key = graph.add_table();
        let table = graph.table(key).unwrap();
        assert_eq!(table.columns.len(), 1);
        let id = &table.columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.ty, ColumnType::Int);
        assert!(id.primary_key);
    }

    #[test]
    fn remove_attribute_refuses_last_column() {
        let mut graph = SchemaGraph::new();
        let key = graph.add_table();
        let err = graph.remove_attribute(key).unwrap_err();
        assert!(matches!(err, SchemaError::MinimumColumns(_)));
        assert_eq!(graph.table(key).unwrap().columns.len(), 1);
    }

    #[test]
    fn remove_attribute_shrinks_by_one() {
        let mut graph = SchemaGraph::new();
        let key = graph.add_table();
        graph
            .add_attribute(key, ColumnType::Varchar, KeyKind::None)
            .unwrap();
        let removed = graph.remove_attribute(key).unwrap();
        assert_eq!(removed.name, "NewColumn");
        assert_eq!(graph.table(key).unwrap().columns.len(), 1);
    }

    #[test]
    fn rename_rejects_collision() {
        let mut graph = SchemaGraph::new();
        let a = graph.add_table();
        let b = graph.add_table();
        graph.rename_table(a, "Customer").unwrap();
        let err = graph.rename_table(b, "Customer").unwrap_err();
        assert_eq!(err, SchemaError::DuplicateTableName("Customer".to_string()));
        assert_eq!(graph.table(b).unwrap().name, "Table_2");
    }

    #[test]
    fn rename_rejects_empty() {
        let mut graph = SchemaGraph::new();
        let a = graph.add_table();
        assert_eq!(
            graph.rename_table(a, "   "),
            Err(SchemaError::EmptyTableName)
        );
    }

    #[test]
    fn foreign_key_is_a_two_step_operation() {
        let mut graph = SchemaGraph::new();
        let customer = graph.add_table();
        let orders = graph.add_table();
        graph.rename_table(customer, "Customer").unwrap();
        graph.rename_table(orders, "Orders").unwrap();

        let outcome = graph
            .add_attribute(orders, ColumnType::Varchar, KeyKind::Foreign)
            .unwrap();
        let prompt = match outcome {
            AttributeOutcome::NeedsReference(prompt) => prompt,
            AttributeOutcome::Added => panic!("foreign key should need a reference"),
        };
        assert_eq!(prompt.candidates, vec!["Customer".to_string()]);
        // Nothing changed yet.
        assert_eq!(graph.table(orders).unwrap().columns.len(), 1);
        assert!(graph.links().is_empty());

        graph.complete_foreign_key(&prompt, "Customer").unwrap();
        let table = graph.table(orders).unwrap();
        let column = table.columns.last().unwrap();
        assert_eq!(column.name, "Customer_id");
        // Copies the reference's primary-key type, not the requested one.
        assert_eq!(column.ty, ColumnType::Int);
        assert!(column.foreign_key);
        assert_eq!(column.reference_table.as_deref(), Some("Customer"));
        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.links()[0].from, customer);
        assert_eq!(graph.links()[0].to, orders);
    }

    #[test]
    fn invalid_reference_aborts_without_mutation() {
        let mut graph = SchemaGraph::new();
        let customer = graph.add_table();
        let orders = graph.add_table();
        graph.rename_table(customer, "Customer").unwrap();

        let AttributeOutcome::NeedsReference(prompt) = graph
            .add_attribute(orders, ColumnType::Int, KeyKind::Foreign)
            .unwrap()
        else {
            panic!("foreign key should need a reference");
        };
        let err = graph.complete_foreign_key(&prompt, "Nope").unwrap_err();
        assert_eq!(err, SchemaError::InvalidReference("Nope".to_string()));
        assert_eq!(graph.table(orders).unwrap().columns.len(), 1);
        assert!(graph.links().is_empty());
    }

    #[test]
    fn foreign_key_with_no_other_tables_is_refused() {
        let mut graph = SchemaGraph::new();
        let only = graph.add_table();
        assert_eq!(
            graph.add_attribute(only, ColumnType::Int, KeyKind::Foreign),
            Err(SchemaError::NoReferenceCandidates)
        );
    }

    #[test]
    fn relation_label_defaults_when_blank() {
        let mut graph = SchemaGraph::new();
        let a = graph.add_table();
        let b = graph.add_table();
        graph.add_relation(a, b, Some("  ")).unwrap();
        graph.add_relation(a, b, Some("places")).unwrap();
        assert_eq!(graph.links()[0].label.as_deref(), Some("Relation"));
        assert_eq!(graph.links()[1].label.as_deref(), Some("places"));
    }

    #[test]
    fn parallel_relations_are_permitted() {
        let mut graph = SchemaGraph::new();
        let a = graph.add_table();
        let b = graph.add_table();
        graph.add_relation(a, b, None).unwrap();
        graph.add_relation(a, b, None).unwrap();
        assert_eq!(graph.links().len(), 2);
    }

    #[test]
    fn operations_on_missing_tables_are_rejected() {
        let mut graph = SchemaGraph::new();
        let ghost = TableKey(42);
        assert_eq!(
            graph.add_attribute(ghost, ColumnType::Int, KeyKind::None),
            Err(SchemaError::UnknownTable(ghost))
        );
        assert!(graph.remove_table(ghost).is_err());
        assert!(graph.remove_relation(0).is_err());
    }

    #[test]
    fn undo_reverts_each_operation() {
        let mut graph = SchemaGraph::new();
        let a = graph.add_table();
        let b = graph.add_table();
        graph.rename_table(a, "Customer").unwrap();
        graph
            .add_attribute(b, ColumnType::Varchar, KeyKind::None)
            .unwrap();
        graph.add_relation(a, b, Some("places")).unwrap();
        graph.remove_attribute(b).unwrap();

        // remove_attribute
        graph.undo().unwrap();
        assert_eq!(graph.table(b).unwrap().columns.len(), 2);
        // add_relation
        graph.undo().unwrap();
        assert!(graph.links().is_empty());
        // add_attribute
        graph.undo().unwrap();
        assert_eq!(graph.table(b).unwrap().columns.len(), 1);
        // rename
        graph.undo().unwrap();
        assert_eq!(graph.table(a).unwrap().name, "Table_1");
        // add_table x2
        graph.undo().unwrap();
        graph.undo().unwrap();
        assert!(graph.nodes().is_empty());
        assert!(graph.undo().is_none());
    }

    #[test]
    fn undo_restores_removed_table_and_relation() {
        let mut graph = SchemaGraph::new();
        let a = graph.add_table();
        let b = graph.add_table();
        graph.add_relation(a, b, None).unwrap();
        graph.remove_relation(0).unwrap();
        graph.remove_table(a).unwrap();

        graph.undo().unwrap();
        assert!(graph.table(a).is_some());
        graph.undo().unwrap();
        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.links()[0].from, a);
    }

    #[test]
    fn undo_of_foreign_key_reverts_column_and_link() {
        let mut graph = SchemaGraph::new();
        let customer = graph.add_table();
        let orders = graph.add_table();
        graph.rename_table(customer, "Customer").unwrap();
        let AttributeOutcome::NeedsReference(prompt) = graph
            .add_attribute(orders, ColumnType::Int, KeyKind::Foreign)
            .unwrap()
        else {
            panic!("foreign key should need a reference");
        };
        graph.complete_foreign_key(&prompt, "Customer").unwrap();

        graph.undo().unwrap();
        assert_eq!(graph.table(orders).unwrap().columns.len(), 1);
        assert!(graph.links().is_empty());
    }

    #[test]
    fn undo_log_survives_serde_round_trip() {
        let mut graph = SchemaGraph::new();
        let a = graph.add_table();
        graph.rename_table(a, "Customer").unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let mut restored: SchemaGraph = serde_json::from_str(&json).unwrap();

        restored.undo().unwrap();
        assert_eq!(restored.table(a).unwrap().name, "Table_1");
        restored.undo().unwrap();
        assert!(restored.nodes().is_empty());
        assert!(restored.undo().is_none());
    }

    #[test]
    fn graph_without_a_stored_log_deserializes() {
        let json = r#"{"nodes":[],"links":[],"next_key":0}"#;
        let graph: SchemaGraph = serde_json::from_str(json).unwrap();
        assert!(graph.nodes().is_empty());
    }

    proptest! {
        #[test]
        fn keys_are_strictly_increasing(count in 1usize..40) {
            let mut graph = SchemaGraph::new();
            let keys: Vec<u32> = (0..count).map(|_| graph.add_table().0).collect();
            for (i, key) in keys.iter().enumerate() {
                prop_assert_eq!(*key, (i as u32) + 1);
            }
        }
    }
}
