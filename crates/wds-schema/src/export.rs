use wds_model::export::{EXPORT_CLASS, UNKNOWN_TABLE};
use wds_model::{ExportedColumn, ExportedRelation, ExportedTable, SchemaExport, TableKey};

use crate::graph::SchemaGraph;

/// Assemble the normalized export document for the whole graph. Relation
/// endpoints that no longer resolve become the placeholder name; a
/// dangling link is never an error here.
pub fn export_schema(graph: &SchemaGraph, database_name: &str) -> SchemaExport {
    let tables = graph
        .nodes()
        .iter()
        .map(|table| ExportedTable {
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|column| ExportedColumn {
                    name: column.name.clone(),
                    ty: column.ty,
                    primary_key: column.primary_key,
                    foreign_key: column.foreign_key,
                    reference_table: column.reference_table.clone(),
                })
                .collect(),
        })
        .collect();

    let relations = graph
        .links()
        .iter()
        .map(|link| ExportedRelation {
            from_table: resolve_name(graph, link.from),
            to_table: resolve_name(graph, link.to),
            relation_name: link.label.clone().unwrap_or_default(),
        })
        .collect();

    SchemaExport {
        database_name: database_name.to_string(),
        class: EXPORT_CLASS.to_string(),
        tables,
        relations,
    }
}

fn resolve_name(graph: &SchemaGraph, key: TableKey) -> String {
    graph
        .table(key)
        .map_or_else(|| UNKNOWN_TABLE.to_string(), |t| t.name.clone())
}
