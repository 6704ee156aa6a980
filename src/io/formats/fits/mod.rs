// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! FITS format implementation.
//!
//! A minimal, read-only reader covering what table export needs:
//! - Header card parsing with typed lookups
//! - HDU walk over a memory-mapped file, classifying each unit once
//! - Binary and ASCII table layouts with windowed row decoding
//!
//! Image pixels and variable-length array heaps are never read.

// Constants module (pub for detection access)
pub mod constants;

pub mod header;
pub mod reader;
pub mod table;

// Re-exports
pub use header::{Header, HeaderValue};
pub use reader::{FitsReader, Hdu};
pub use table::{FitsTable, TableLayout};
