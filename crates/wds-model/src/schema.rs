use serde::{Deserialize, Serialize};
use std::fmt;

use crate::column::Column;

/// Identity of a table node. Unique for the lifetime of a graph, assigned
/// from a monotonically increasing counter starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TableKey(pub u32);

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One table on the design surface. Names are unique within a graph;
/// the graph operations enforce this on creation and rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    pub key: TableKey,
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableNode {
    /// The table's primary-key column, when one is flagged.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// A directed table-to-table relation. Endpoints are table keys and may
/// dangle after a removal; export resolves dangling keys to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationLink {
    pub from: TableKey,
    pub to: TableKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, ColumnType};

    #[test]
    fn primary_key_finds_flagged_column() {
        let table = TableNode {
            key: TableKey(1),
            name: "Customer".to_string(),
            columns: vec![
                Column::new("name", ColumnType::Varchar),
                Column::identity(),
            ],
        };
        assert_eq!(table.primary_key().unwrap().name, "id");
    }

    #[test]
    fn primary_key_is_none_without_flag() {
        let table = TableNode {
            key: TableKey(1),
            name: "Customer".to_string(),
            columns: vec![Column::new("name", ColumnType::Varchar)],
        };
        assert!(table.primary_key().is_none());
    }
}
