// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::fmt;
use std::io::{IsTerminal as _, Stdout, StdoutLock};

use clap::error::ErrorKind;
use clap::ValueEnum;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

use fitstream::export::NdjsonWriter;
use fitstream::FitsError;

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Log verbosity for the stderr subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the fmt subscriber on stderr.
///
/// stdout carries the JSON protocol and must never see a log line.
/// Environment variables are not consulted.
pub fn init_logging(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// NDJSON writer over locked stdout.
pub fn stdout_writer(stdout: &Stdout) -> NdjsonWriter<StdoutLock<'_>> {
    NdjsonWriter::new(stdout.lock())
}

/// Marker for a failure whose error message is already on stdout.
#[derive(Debug)]
pub struct AlreadyReported;

impl fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error already reported on the output stream")
    }
}

impl std::error::Error for AlreadyReported {}

/// Convert a command-line parse failure into a reportable error.
pub fn usage_error(err: &clap::Error) -> anyhow::Error {
    anyhow::anyhow!(usage_message(err))
}

/// One-line description of a command-line parse failure.
pub fn usage_message(err: &clap::Error) -> String {
    if matches!(
        err.kind(),
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    ) {
        return "Insufficient arguments.".to_string();
    }

    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("Usage:"))
        .filter(|line| !line.is_empty() && !line.starts_with("tip:"))
        .collect::<Vec<_>>()
        .join(" ");

    message
        .strip_prefix("error: ")
        .unwrap_or(&message)
        .to_string()
}

/// Report a failure as a single `{"error": ...}` line on stdout.
///
/// Failures already reported in-band are only logged.
pub fn report_error(err: &anyhow::Error) {
    if err.is::<AlreadyReported>() {
        return;
    }

    match err.downcast_ref::<FitsError>() {
        Some(fits) => error!(
            context = "cli",
            kind = fits.kind(),
            fields = ?fits.log_fields(),
            "{fits}"
        ),
        None => error!(context = "cli", "{err}"),
    }

    let stdout = std::io::stdout();
    let mut out = stdout_writer(&stdout);
    let message = serde_json::json!({ "error": err.to_string() });
    // Nothing left to report to if stdout itself is gone.
    let _ = out.write(&message);
}

/// Progress bar wrapper for consistent progress reporting.
///
/// Draws on stderr, and only when stderr is a terminal.
pub struct ProgressBar {
    inner: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a new progress bar.
    pub fn new(total: u64, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let inner = if std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::with_draw_target(
                Some(total),
                indicatif::ProgressDrawTarget::stderr(),
            );
            if let Ok(style) = indicatif::ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {prefix} {msg}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb.set_prefix(prefix);
            Some(pb)
        } else {
            None
        };

        Self { inner }
    }

    /// Move the bar to `position`.
    pub fn set_position(&self, position: u64) {
        if let Some(pb) = &self.inner {
            pb.set_position(position);
        }
    }

    /// Finish the progress bar with a message.
    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }

    /// Stop drawing, leaving the bar where it is.
    pub fn abandon(&self) {
        if let Some(pb) = &self.inner {
            pb.abandon();
        }
    }
}
