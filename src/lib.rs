// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Fitstream
//!
//! Streaming NDJSON export of FITS tables.
//!
//! This library turns the units of a FITS container into line-delimited
//! JSON for consumers that cannot read the binary format:
//! - **Inspection** of every HDU in [`export::inspect`]
//! - **Streaming export** of one table HDU in [`export::export_unit`]
//! - **FITS decoding** in [`io::formats::fits`](crate::io::formats::fits)
//!
//! ## Architecture
//!
//! - `core/` - Error type and decoded cell values
//! - `io/` - Memory-mapped arena, format detection, the [`TableSource`]
//!   trait and the FITS reader
//! - `export/` - Row/column caps, schema flattening, wire messages and the
//!   chunked export session
//!
//! ## Example: Listing units
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! for unit in fitstream::export::inspect("catalog.fits")? {
//!     println!("{} {} table={}", unit.index, unit.name, unit.is_table);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Streaming a table
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use fitstream::export::{ExportOptions, ExportSession};
//! use fitstream::io::formats::fits::FitsReader;
//!
//! let reader = FitsReader::open("catalog.fits")?;
//! let table = reader.table(1)?;
//! let options = ExportOptions::new().with_max_rows(1000);
//! for message in ExportSession::new(&table, &options)? {
//!     println!("{}", serde_json::to_string(&message)?);
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CellValue, FitsError, Result, ScalarType};

// I/O types (arena, detection, metadata, traits, FITS reader)
pub mod io;

// Re-export key I/O types
pub use io::metadata::{ColumnInfo, FileFormat, UnitInfo, UnitKind};
pub use io::traits::TableSource;
pub use io::MmapArena;

// Inspection and streaming export
pub mod export;

pub use export::{ExportOptions, ExportSession, ExportSummary, Message, NdjsonWriter};
