//! Table rendering for `show`, `preview`, and `status` output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use wds_ingest::SourceData;
use wds_map::MappingSession;
use wds_model::MappingEntry;
use wds_schema::SchemaGraph;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

pub fn print_schema(graph: &SchemaGraph) {
    let mut tables = Table::new();
    tables.set_header(vec![
        header_cell("Key"),
        header_cell("Table"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut tables);
    for node in graph.nodes() {
        let columns = node
            .columns
            .iter()
            .map(|c| {
                let mut label = format!("{} {}", c.name, c.ty);
                if c.primary_key {
                    label.push_str(" PK");
                }
                if let Some(reference) = &c.reference_table {
                    label.push_str(&format!(" -> {reference}"));
                }
                label
            })
            .collect::<Vec<_>>()
            .join("\n");
        tables.add_row(vec![node.key.to_string(), node.name.clone(), columns]);
    }
    println!("{tables}");

    if graph.links().is_empty() {
        return;
    }
    let mut relations = Table::new();
    relations.set_header(vec![
        header_cell("#"),
        header_cell("From"),
        header_cell("To"),
        header_cell("Label"),
    ]);
    apply_table_style(&mut relations);
    for (index, link) in graph.links().iter().enumerate() {
        let endpoint = |key| {
            graph
                .table(key)
                .map_or_else(|| format!("{key} (removed)"), |n| n.name.clone())
        };
        relations.add_row(vec![
            index.to_string(),
            endpoint(link.from),
            endpoint(link.to),
            link.label.clone().unwrap_or_default(),
        ]);
    }
    println!("{relations}");
}

pub fn print_preview(source: &SourceData) {
    let mut table = Table::new();
    table.set_header(source.columns.iter().map(|c| header_cell(c)));
    apply_table_style(&mut table);
    for record in source.preview() {
        table.add_row(
            source
                .columns
                .iter()
                .map(|c| record.get(c).map(String::as_str).unwrap_or_default()),
        );
    }
    println!("{table}");
    println!(
        "{} rows, {} columns",
        source.records.len(),
        source.columns.len()
    );
}

pub fn print_mapping(mapping: &[MappingEntry]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source column"),
        header_cell("Destination column"),
        header_cell("Lookup table"),
        header_cell("Lookup column"),
    ]);
    apply_table_style(&mut table);
    for entry in mapping {
        table.add_row(vec![
            entry.source_column.as_str(),
            entry.destination_column.as_str(),
            entry.lookup_table.as_deref().unwrap_or(""),
            entry.lookup_column.as_deref().unwrap_or(""),
        ]);
    }
    println!("{table}");
}

pub fn print_status(session: &MappingSession) {
    println!("Database: {}", session.database_name());
    println!(
        "Destination tables: {}",
        session.destination_tables().join(", ")
    );
    match session.selected_table() {
        Some(table) => println!("Selected: {table}"),
        None => println!("Selected: (none)"),
    }
    match session.last_path() {
        Some(path) => println!("Source: {}", path.display()),
        None => println!("Source: (none loaded)"),
    }
    if !session.working_mapping().is_empty() {
        println!("Working mapping:");
        print_mapping(session.working_mapping());
    }
    if session.saved().is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Saved table"),
        header_cell("Entries"),
        header_cell("Rows"),
        header_cell("Saved at"),
    ]);
    apply_table_style(&mut table);
    for snapshot in session.saved() {
        table.add_row(vec![
            snapshot.table.clone(),
            snapshot.mapping.len().to_string(),
            snapshot.rows.len().to_string(),
            snapshot.saved_at.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
}
