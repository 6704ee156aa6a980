// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Fitstream CLI
//!
//! Line-delimited JSON front end for FITS files.
//!
//! ## Usage
//!
//! ```sh
//! # List the units of a file
//! fitstream info catalog.fits
//!
//! # Stream unit 1, at most 1000 rows and 10 columns
//! fitstream data catalog.fits 1 --max-rows 1000 --max-cols 10
//! ```
//!
//! stdout carries only the JSON protocol. Every failure is one
//! `{"error": "..."}` line on stdout followed by exit code 1; logs and the
//! optional progress bar go to stderr.

mod cmd;
mod common;

use std::process;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use cmd::{DataCmd, InfoCmd};
use common::{LogLevel, Result};

/// Fitstream - FITS tables as NDJSON
///
/// Inspect the units of a FITS file, or stream one table unit as a schema
/// message followed by chunked data messages.
#[derive(Parser, Clone)]
#[command(name = "fitstream")]
#[command(about = "Stream FITS tables as line-delimited JSON", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Log verbosity (logs go to stderr)
    #[arg(long, global = true, value_enum, value_name = "LEVEL", default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Draw a progress bar on stderr while streaming
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// List every unit of a FITS file as one JSON array
    Info(InfoCmd),

    /// Stream one table unit as schema and data messages
    Data(DataCmd),
}

fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => return Err(common::usage_error(&e)),
    };

    common::init_logging(cli.log_level);

    match cli.command {
        Commands::Info(cmd) => cmd.run(),
        Commands::Data(cmd) => cmd.run(cli.progress),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        common::report_error(&e);
        process::exit(1);
    }
}
