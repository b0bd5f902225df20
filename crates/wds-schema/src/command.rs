use serde::{Deserialize, Serialize};

use wds_model::{Column, RelationLink, TableKey, TableNode};

/// One applied edit, recorded with enough context to revert it. The log
/// is append-only; undo pops commands in reverse application order, so
/// every inverse acts on the exact state the command left behind. The
/// log serializes with the graph so undo works across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    AddTable { key: TableKey },
    RenameTable { key: TableKey, previous: String },
    AddColumn { table: TableKey },
    /// Foreign-key completion: a column and a relation, reverted together.
    AddForeignKey { table: TableKey, link_index: usize },
    AddRelation { index: usize },
    RemoveTable { index: usize, node: TableNode },
    RemoveRelation { index: usize, link: RelationLink },
    RemoveColumn { table: TableKey, column: Column },
}

impl Command {
    /// Short human-readable label for notifications ("Undid: ...").
    pub fn describe(&self) -> String {
        match self {
            Command::AddTable { key } => format!("add table {key}"),
            Command::RenameTable { previous, .. } => format!("rename of '{previous}'"),
            Command::AddColumn { table } => format!("add attribute on table {table}"),
            Command::AddForeignKey { table, .. } => format!("add foreign key on table {table}"),
            Command::AddRelation { .. } => "add relation".to_string(),
            Command::RemoveTable { node, .. } => format!("remove table '{}'", node.name),
            Command::RemoveRelation { .. } => "remove relation".to_string(),
            Command::RemoveColumn { column, .. } => format!("remove attribute '{}'", column.name),
        }
    }
}
