//! CLI argument definitions for the warehouse designer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "wds",
    version,
    about = "Warehouse Designer - design star schemas and load data into them",
    long_about = "Design data-warehouse schemas as a table graph, create them on the\n\
                  backend, then map source files (CSV/TSV/XLSX) onto dimension and\n\
                  fact tables and load the rows."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Backend base URL.
    #[arg(
        long = "base-url",
        value_name = "URL",
        default_value = "http://127.0.0.1:5000",
        global = true
    )]
    pub base_url: String,

    /// Chat webhook URL.
    #[arg(
        long = "chat-url",
        value_name = "URL",
        default_value = "http://127.0.0.1:5005/webhooks/rest/webhook",
        global = true
    )]
    pub chat_url: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a schema graph and export or create it on the backend.
    Design(DesignArgs),

    /// Map source-file columns onto tables and load rows.
    Map(MapArgs),

    /// Inspect and manage backend databases.
    Db(DbArgs),
}

#[derive(Args)]
pub struct DesignArgs {
    /// Schema file the design is read from and written back to.
    #[arg(
        long = "file",
        value_name = "PATH",
        default_value = "schema.json",
        global = true
    )]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: DesignCommand,
}

#[derive(Subcommand)]
pub enum DesignCommand {
    /// Start a new schema design for a database.
    Init {
        /// Database name the schema will be created under.
        #[arg(value_name = "DATABASE")]
        database: String,
    },

    /// Add a table with a generated name and an identity column.
    AddTable,

    /// Rename a table.
    RenameTable {
        #[arg(value_name = "KEY")]
        key: u32,
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Add a column to a table.
    ///
    /// Foreign keys are two-step: run with --foreign to list reference
    /// candidates, then run again with --reference to pick one.
    AddAttribute {
        #[arg(value_name = "KEY")]
        key: u32,

        /// Column type (INT, VARCHAR, NVARCHAR, DATETIME, BIT, DECIMAL,
        /// FLOAT, CHAR, or NCHAR).
        #[arg(value_name = "TYPE")]
        column_type: String,

        /// Mark the column as a primary key.
        #[arg(long = "primary", conflicts_with_all = ["foreign", "reference"])]
        primary: bool,

        /// Make the column a foreign key; prints reference candidates.
        #[arg(long = "foreign")]
        foreign: bool,

        /// Reference table for a foreign key (implies --foreign).
        #[arg(long = "reference", value_name = "TABLE")]
        reference: Option<String>,
    },

    /// Add a labeled relation between two tables.
    AddRelation {
        #[arg(value_name = "FROM")]
        from: u32,
        #[arg(value_name = "TO")]
        to: u32,
        /// Relation label (default: "Relation").
        #[arg(long = "label", value_name = "LABEL")]
        label: Option<String>,
    },

    /// Remove a table. Relations touching it are kept.
    RemoveTable {
        #[arg(value_name = "KEY")]
        key: u32,
    },

    /// Remove a relation by its index in `show` output.
    RemoveRelation {
        #[arg(value_name = "INDEX")]
        index: usize,
    },

    /// Remove the last column of a table.
    RemoveAttribute {
        #[arg(value_name = "KEY")]
        key: u32,
    },

    /// Undo the most recent structural change.
    Undo,

    /// Print the current tables, columns, and relations.
    Show,

    /// Export the schema as a normalized JSON document.
    Export {
        /// Write the document to a file instead of stdout.
        #[arg(long = "out", value_name = "PATH")]
        out: Option<PathBuf>,

        /// Also submit the document to create the database and tables.
        #[arg(long = "send")]
        send: bool,
    },
}

#[derive(Args)]
pub struct MapArgs {
    /// Session file the mapping state is read from and written back to.
    #[arg(
        long = "file",
        value_name = "PATH",
        default_value = "mapping.json",
        global = true
    )]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: MapCommand,
}

#[derive(Subcommand)]
pub enum MapCommand {
    /// Start a mapping session against an existing database.
    Init {
        #[arg(value_name = "DATABASE")]
        database: String,

        /// Destination tables; fetched from the backend when omitted.
        #[arg(long = "table", value_name = "NAME")]
        tables: Vec<String>,
    },

    /// Parse a source file (CSV, TSV, or XLSX) and show a preview.
    Load {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Re-parse the last loaded source file.
    Reload,

    /// Choose the destination table for the working mapping.
    Select {
        #[arg(value_name = "TABLE")]
        table: String,
    },

    /// Map a source column to a destination column.
    Assign {
        #[arg(value_name = "SOURCE_COLUMN")]
        source: String,
        #[arg(value_name = "DESTINATION_COLUMN")]
        destination: String,
    },

    /// Save the working mapping and rows for the selected table.
    Save,

    /// Save and submit the working mapping as dimension rows.
    SendDimension,

    /// Show the fact mapping synthesized from saved dimensions.
    AutoFact,

    /// Submit the fact rows.
    SendFact,

    /// Show the first rows of the loaded source file.
    Preview,

    /// Show the session state: selection, working mapping, saved tables.
    Status,
}

#[derive(Args)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Subcommand)]
pub enum DbCommand {
    /// List databases on the backend.
    List,

    /// Check whether a database exists.
    Check {
        #[arg(value_name = "DATABASE")]
        database: String,
    },

    /// Delete a database.
    Delete {
        #[arg(value_name = "DATABASE")]
        database: String,
    },

    /// List the tables of a database.
    Tables {
        #[arg(value_name = "DATABASE")]
        database: String,
    },

    /// Delete one table from a database.
    DeleteTable {
        #[arg(value_name = "DATABASE")]
        database: String,
        #[arg(value_name = "TABLE")]
        table: String,
    },

    /// Train the conversational agent on a database.
    Train {
        #[arg(value_name = "DATABASE")]
        database: String,
    },

    /// Send a message to the conversational agent.
    Chat {
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Sender identifier passed through to the agent.
        #[arg(long = "sender", default_value = "cli")]
        sender: String,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
