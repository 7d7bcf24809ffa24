use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use reporter_export::ReporterApp;
use reporter_logging::LogFormat;

mod config;
mod exports;

use config::ReporterConfig;
use exports::{handle_exports_command, ExportsAction};

#[derive(Parser, Debug)]
#[command(
    name = "reporter",
    about = "Browse Reporter app exports",
    version,
    author
)]
struct Cli {
    /// Directory holding the *-reporter-export.json files
    /// (default: ~/Dropbox/Apps/Reporter-App)
    #[arg(short = 'd', long, global = true)]
    dir: Option<PathBuf>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    #[command(subcommand)]
    command: ExportsAction,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ReporterConfig::load(&working_dir)?.unwrap_or_default();

    // CLI flags take priority over the config file
    let log_level = cli
        .log_level
        .clone()
        .or(config.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    let log_format = cli
        .log_format
        .map(LogFormat::from)
        .or(config.log_format)
        .unwrap_or_default();
    reporter_logging::init_tracing(&log_level, log_format);

    let app = match cli.dir.or(config.directory) {
        Some(dir) => ReporterApp::with_dir(dir),
        None => ReporterApp::new()?,
    };
    tracing::debug!("Using export directory {:?}", app.directory());

    handle_exports_command(app, cli.command)
}
