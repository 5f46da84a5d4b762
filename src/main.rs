//! Notes Export - dump a NotesV7 note store to HTML files.
//!
//! Reads every note from the store's `SQLite` database and writes it to
//! `notes/<title>.html`, setting the file's access and modification time to
//! the note's last edit.
//!
//!   notes-export                              # db/NotesV7.storedata -> notes/
//!   notes-export --db Notes.storedata -o out  # custom paths
//!   notes-export --group-by note              # one file per note row
//!   notes-export --format json                # machine-readable summary

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{export_notes, format_summary_json, format_summary_text, SummaryFormat};
use cli::Cli;
use infrastructure::{load_config, render_config};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    // Failed notes and fatal errors are both reported, never turned into an exit code.
    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }

    std::process::exit(0);
}

/// Main application logic.
fn run(cli: &Cli) -> domain::Result<()> {
    let format = cli
        .summary_format()
        .map_err(|message| domain::AppError::Config { message })?;

    let config = load_config(cli.config.as_deref())?;
    let config = cli
        .apply_overrides(config)
        .map_err(|message| domain::AppError::Config { message })?;

    if cli.print_config {
        print!("{}", render_config(&config)?);
        return Ok(());
    }

    let summary = export_notes(&config.export)?;

    let output = match format {
        SummaryFormat::Text => format!("\n{}", format_summary_text(&summary)),
        SummaryFormat::Json => format_summary_json(&summary).map_err(domain::AppError::json)?,
    };
    println!("{output}");

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}
