//! Warehouse Designer CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;
use wds_backend::BackendError;
use wds_cli::logging::{LogConfig, LogFormat, init_logging};
use wds_map::MapError;

mod cli;
mod commands;
mod store;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{build_client, run_db, run_design, run_map};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = build_client(&cli.base_url, &cli.chat_url).and_then(|client| {
        match &cli.command {
            Command::Design(args) => run_design(args, &client),
            Command::Map(args) => run_map(args, &client),
            Command::Db(args) => run_db(args, &client),
        }
    });
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {}", render_error(&error));
            1
        }
    };
    std::process::exit(exit_code);
}

/// Backend failures render their notification text; everything else
/// keeps the full context chain.
fn render_error(error: &anyhow::Error) -> String {
    if let Some(backend) = error.downcast_ref::<BackendError>() {
        return backend.user_message().to_string();
    }
    if let Some(MapError::Backend(backend)) = error.downcast_ref::<MapError>() {
        return backend.user_message().to_string();
    }
    format!("{error:#}")
}


/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
