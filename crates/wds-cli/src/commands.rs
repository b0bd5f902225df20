//! Command runners behind each CLI subcommand.

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use serde_json::Value;
use tracing::info;

use wds_backend::{BackendClient, BackendConfig};
use wds_model::{ColumnType, TableKey};
use wds_schema::{AttributeOutcome, KeyKind, SchemaGraph, export_schema};

use crate::cli::{DbArgs, DbCommand, DesignArgs, DesignCommand, MapArgs, MapCommand};
use crate::store::{
    DesignFile, load_design, load_session, save_design, save_session,
};
use crate::summary::{apply_table_style, print_mapping, print_preview, print_schema, print_status};

pub fn run_design(args: &DesignArgs, client: &BackendClient) -> Result<()> {
    if let DesignCommand::Init { database } = &args.command {
        let design = DesignFile {
            database_name: database.clone(),
            graph: SchemaGraph::new(),
        };
        save_design(&args.file, &design)?;
        println!("initialized design for {database} in {}", args.file.display());
        return Ok(());
    }

    let mut design = load_design(&args.file)?;
    match &args.command {
        DesignCommand::Init { .. } => unreachable!("handled above"),
        DesignCommand::AddTable => {
            let key = design.graph.add_table();
            let name = design
                .graph
                .table(key)
                .map(|n| n.name.clone())
                .unwrap_or_default();
            save_design(&args.file, &design)?;
            println!("added table {name} (key {key})");
        }
        DesignCommand::RenameTable { key, name } => {
            design.graph.rename_table(TableKey(*key), name)?;
            save_design(&args.file, &design)?;
            println!("renamed table {key} to {name}");
        }
        DesignCommand::AddAttribute {
            key,
            column_type,
            primary,
            foreign,
            reference,
        } => {
            let ty: ColumnType = column_type.parse()?;
            let kind = if *primary {
                KeyKind::Primary
            } else if *foreign || reference.is_some() {
                KeyKind::Foreign
            } else {
                KeyKind::None
            };
            let table = TableKey(*key);
            match design.graph.add_attribute(table, ty, kind)? {
                AttributeOutcome::Added => {
                    save_design(&args.file, &design)?;
                    println!("added {ty} column to table {key}");
                }
                AttributeOutcome::NeedsReference(prompt) => match reference {
                    Some(choice) => {
                        design.graph.complete_foreign_key(&prompt, choice)?;
                        save_design(&args.file, &design)?;
                        println!("added foreign key {choice}_id to table {key}");
                    }
                    None => {
                        println!("foreign key needs a reference table; candidates:");
                        for candidate in &prompt.candidates {
                            println!("  {candidate}");
                        }
                        println!("re-run with --reference <TABLE> to finish");
                    }
                },
            }
        }
        DesignCommand::AddRelation { from, to, label } => {
            design
                .graph
                .add_relation(TableKey(*from), TableKey(*to), label.as_deref())?;
            save_design(&args.file, &design)?;
            println!("added relation {from} -> {to}");
        }
        DesignCommand::RemoveTable { key } => {
            let name = design.graph.remove_table(TableKey(*key))?;
            save_design(&args.file, &design)?;
            println!("removed table {name}");
        }
        DesignCommand::RemoveRelation { index } => {
            design.graph.remove_relation(*index)?;
            save_design(&args.file, &design)?;
            println!("removed relation {index}");
        }
        DesignCommand::RemoveAttribute { key } => {
            let column = design.graph.remove_attribute(TableKey(*key))?;
            save_design(&args.file, &design)?;
            println!("removed column {} from table {key}", column.name);
        }
        DesignCommand::Undo => match design.graph.undo() {
            Some(command) => {
                save_design(&args.file, &design)?;
                println!("undid: {}", command.describe());
            }
            None => println!("nothing to undo"),
        },
        DesignCommand::Show => print_schema(&design.graph),
        DesignCommand::Export { out, send } => {
            let export = export_schema(&design.graph, &design.database_name);
            let document =
                serde_json::to_string_pretty(&export).context("serialize export document")?;
            match out {
                Some(path) => {
                    std::fs::write(path, &document)
                        .with_context(|| format!("write export to {}", path.display()))?;
                    println!("wrote export to {}", path.display());
                }
                None => println!("{document}"),
            }
            if *send {
                let response = client.create_database(&export)?;
                info!(database = %design.database_name, "database created");
                print_response(&response);
            }
        }
    }
    Ok(())
}

pub fn run_map(args: &MapArgs, client: &BackendClient) -> Result<()> {
    if let MapCommand::Init { database, tables } = &args.command {
        let tables = if tables.is_empty() {
            let response = client.get_tables(database)?;
            let tables = table_names(&response);
            if tables.is_empty() {
                bail!("backend reported no tables for {database}");
            }
            tables
        } else {
            tables.clone()
        };
        let session = wds_map::MappingSession::new(database.clone(), tables);
        save_session(&args.file, &session)?;
        println!(
            "initialized mapping session for {database} ({} tables) in {}",
            session.destination_tables().len(),
            args.file.display()
        );
        return Ok(());
    }

    let mut session = load_session(&args.file)?;
    match &args.command {
        MapCommand::Init { .. } => unreachable!("handled above"),
        MapCommand::Load { path } => {
            let source = session.load_file(path)?;
            print_preview(source);
            save_session(&args.file, &session)?;
        }
        MapCommand::Reload => {
            let source = session.reload_file()?;
            print_preview(source);
            save_session(&args.file, &session)?;
        }
        MapCommand::Select { table } => {
            session.select_table(table)?;
            save_session(&args.file, &session)?;
            println!("selected {table}");
        }
        MapCommand::Assign {
            source,
            destination,
        } => {
            session.assign(source, destination)?;
            save_session(&args.file, &session)?;
            println!("mapped {source} -> {destination}");
        }
        MapCommand::Save => {
            let table = session.save_mapping()?;
            save_session(&args.file, &session)?;
            println!("saved mapping for {table}");
        }
        MapCommand::SendDimension => {
            let outcome = session.send_dimension(client)?;
            save_session(&args.file, &session)?;
            println!("inserted dimension rows into {}", outcome.table);
            if !outcome.reloaded {
                println!("source file was not reloaded; run `map load` before the next table");
            }
            print_response(&outcome.response);
        }
        MapCommand::AutoFact => {
            let mapping = session.auto_fact_mapping();
            if mapping.is_empty() {
                println!("no saved dimensions to synthesize from");
            } else {
                print_mapping(&mapping);
            }
        }
        MapCommand::SendFact => {
            let payload = session.fact_payload()?;
            println!(
                "sending {} rows to {} with {} mapping entries",
                payload.data.len(),
                payload.fact_table,
                payload.mapping.len()
            );
            let response = session.send_fact(client)?;
            print_response(&response);
        }
        MapCommand::Preview => match session.source() {
            Some(source) => print_preview(source),
            None => println!("no source file loaded"),
        },
        MapCommand::Status => print_status(&session),
    }
    Ok(())
}

pub fn run_db(args: &DbArgs, client: &BackendClient) -> Result<()> {
    match &args.command {
        DbCommand::List => {
            let response = client.list_databases()?;
            let names = string_items(&response);
            if names.is_empty() {
                print_response(&response);
            } else {
                let mut table = Table::new();
                table.set_header(vec!["Database"]);
                apply_table_style(&mut table);
                for name in names {
                    table.add_row(vec![name]);
                }
                println!("{table}");
            }
        }
        DbCommand::Check { database } => {
            let response = client.check_database(database)?;
            print_response(&response);
        }
        DbCommand::Delete { database } => {
            let response = client.delete_database(database)?;
            println!("deleted {database}");
            print_response(&response);
        }
        DbCommand::Tables { database } => {
            let response = client.get_tables(database)?;
            let names = table_names(&response);
            if names.is_empty() {
                print_response(&response);
            } else {
                let mut table = Table::new();
                table.set_header(vec!["Table"]);
                apply_table_style(&mut table);
                for name in names {
                    table.add_row(vec![name]);
                }
                println!("{table}");
            }
        }
        DbCommand::DeleteTable { database, table } => {
            let response = client.delete_table(database, table)?;
            println!("deleted {table} from {database}");
            print_response(&response);
        }
        DbCommand::Train { database } => {
            let response = client.train_chatbot(database)?;
            print_response(&response);
        }
        DbCommand::Chat { message, sender } => {
            let body = wds_model::ChatMessage {
                sender: sender.clone(),
                message: message.clone(),
            };
            let response = client.send_chat_message(&body)?;
            print_chat(&response);
        }
    }
    Ok(())
}

pub fn build_client(base_url: &str, chat_url: &str) -> Result<BackendClient> {
    let client = BackendClient::new(BackendConfig {
        base_url: base_url.to_string(),
        chat_url: chat_url.to_string(),
    })?;
    Ok(client)
}

/// Pull table names out of a backend response, which is either a plain
/// array of strings or an object with a "tables" array.
fn table_names(value: &Value) -> Vec<String> {
    let items = value
        .as_array()
        .or_else(|| value.get("tables").and_then(Value::as_array));
    string_values(items)
}

/// Pull string items out of a response that is either a plain array or
/// an object with a "databases" array.
fn string_items(value: &Value) -> Vec<String> {
    let items = value
        .as_array()
        .or_else(|| value.get("databases").and_then(Value::as_array));
    string_values(items)
}

fn string_values(items: Option<&Vec<Value>>) -> Vec<String> {
    items
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn print_response(response: &Value) {
    if response.is_null() {
        return;
    }
    match serde_json::to_string_pretty(response) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{response}"),
    }
}

/// Chat replies come back as an array of `{recipient_id, text}` objects.
fn print_chat(response: &Value) {
    let Some(replies) = response.as_array() else {
        print_response(response);
        return;
    };
    for reply in replies {
        match reply.get("text").and_then(Value::as_str) {
            Some(text) => println!("{text}"),
            None => print_response(reply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_names_accepts_both_response_shapes() {
        let plain = json!(["Customer", "FactSales"]);
        assert_eq!(table_names(&plain), ["Customer", "FactSales"]);

        let wrapped = json!({ "tables": ["Customer"] });
        assert_eq!(table_names(&wrapped), ["Customer"]);

        let unrelated = json!({ "message": "ok" });
        assert!(table_names(&unrelated).is_empty());
    }

    #[test]
    fn string_items_reads_database_lists() {
        let wrapped = json!({ "databases": ["a", "b"] });
        assert_eq!(string_items(&wrapped), ["a", "b"]);
    }
}
