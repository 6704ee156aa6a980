// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspection and streaming export.
//!
//! Two self-contained operations share one container-opening routine:
//!
//! - [`inspect`] lists every unit of a file
//! - [`export_unit`] streams one table unit as NDJSON messages
//!
//! Each opens the file, does its work, and releases the mapping on every
//! exit path.
//!
//! # Example
//!
//! ```rust,no_run
//! use fitstream::export::{export_unit, ExportOptions};
//! use fitstream::export::message::NdjsonWriter;
//!
//! let mut out = NdjsonWriter::new(std::io::stdout().lock());
//! let summary = export_unit("catalog.fits", 1, &ExportOptions::default(), &mut out, |_| {})?;
//! println!("exported {} rows", summary.rows_written);
//! # Ok::<(), fitstream::FitsError>(())
//! ```

pub mod config;
pub mod limits;
pub mod message;
pub mod schema;
pub mod session;

pub use config::{ExportOptions, DEFAULT_CHUNK_SIZE};
pub use limits::{compute_limits, RowLimits};
pub use message::{Message, NdjsonWriter};
pub use schema::{derive_schema, Field, Flattener, Schema};
pub use session::ExportSession;

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::core::{FitsError, Result};
use crate::io::detection::detect_format;
use crate::io::formats::fits::{FitsReader, FitsTable};
use crate::io::metadata::{FileFormat, UnitInfo};

/// Outcome of a streaming export whose schema was emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Rows the export set out to emit
    pub total_rows: u64,
    /// Rows actually emitted
    pub rows_written: u64,
    /// Messages written, the error message included
    pub messages: usize,
    /// Error that ended the stream early; already written to the output
    pub error: Option<FitsError>,
}

impl ExportSummary {
    /// Check if every row was emitted.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.rows_written == self.total_rows
    }
}

/// Open a container, rejecting files that are not FITS.
///
/// # Errors
///
/// Returns `NotFound` for a missing path and `Decode` for anything that
/// does not parse as FITS.
pub fn open_container<P: AsRef<Path>>(path: P) -> Result<FitsReader> {
    let path = path.as_ref();
    if detect_format(path)? == FileFormat::Unknown {
        return Err(FitsError::decode(
            "detection",
            format!("'{}' is not a FITS file", path.display()),
        ));
    }
    FitsReader::open(path)
}

/// List the units of a container.
///
/// Only headers are read.
///
/// # Errors
///
/// Returns `NotFound` or `Decode` as [`open_container`] does.
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<Vec<UnitInfo>> {
    let reader = open_container(path)?;
    let units = reader.units();
    info!(
        context = "inspect",
        path = %reader.path(),
        units = units.len(),
        "Inspected container"
    );
    Ok(units)
}

/// Resolve a unit index given on the command line to a table.
///
/// # Errors
///
/// Returns `IndexOutOfBounds` for negative or too-large indices and
/// `NotATable` for units without tabular capability.
pub fn select_table(reader: &FitsReader, index: i64) -> Result<FitsTable<'_>> {
    let position = usize::try_from(index)
        .map_err(|_| FitsError::index_out_of_bounds(index, reader.unit_count()))?;
    reader.table(position)
}

/// Write every message of a session, calling `on_message` after each.
///
/// A window failure has already been reported in-band when this returns;
/// it is surfaced through [`ExportSummary::error`].
///
/// # Errors
///
/// Returns `Output` if the output stream fails.
pub fn write_session<W: Write>(
    mut session: ExportSession<'_>,
    out: &mut NdjsonWriter<W>,
    mut on_message: impl FnMut(&Message),
) -> Result<ExportSummary> {
    let total_rows = session.total_rows();
    let mut rows_written = 0;
    let mut messages = 0;

    for message in session.by_ref() {
        out.write(&message)?;
        messages += 1;
        if let Message::Data(data) = &message {
            rows_written = data.progress;
        }
        on_message(&message);
    }

    Ok(ExportSummary {
        total_rows,
        rows_written,
        messages,
        error: session.into_error(),
    })
}

/// Stream one table unit of a container.
///
/// Failures before the schema message (missing file, bad index, non-table
/// unit, bad options) are returned as `Err` with nothing written; the
/// caller reports them. Once the schema is out, a failing window is
/// reported in-band and returned in [`ExportSummary::error`].
///
/// # Errors
///
/// Returns the first error raised before streaming starts, or `Output`
/// if writing fails.
pub fn export_unit<P: AsRef<Path>, W: Write>(
    path: P,
    index: i64,
    options: &ExportOptions,
    out: &mut NdjsonWriter<W>,
    on_message: impl FnMut(&Message),
) -> Result<ExportSummary> {
    let reader = open_container(path)?;
    let table = select_table(&reader, index)?;
    let session = ExportSession::new(&table, options)?;

    let summary = write_session(session, out, on_message)?;
    info!(
        context = "export_unit",
        path = %reader.path(),
        index,
        rows = summary.rows_written,
        total_rows = summary.total_rows,
        complete = summary.is_complete(),
        "Export finished"
    );
    Ok(summary)
}
