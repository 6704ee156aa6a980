// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core traits for unified table access.
//!
//! The exporter never talks to a container format directly. It reads
//! through [`TableSource`], which any tabular unit reader implements, so
//! schema derivation and chunked streaming stay independent of how cells
//! are laid out on disk.

use std::ops::Range;

use crate::core::{CellValue, Result};

use super::metadata::ColumnInfo;

/// Windowed, read-only access to one tabular unit.
///
/// # Example
///
/// ```no_run
/// use fitstream::io::traits::TableSource;
///
/// fn describe(table: &dyn TableSource) {
///     println!("{} rows x {} columns", table.num_rows(), table.columns().len());
/// }
/// ```
pub trait TableSource {
    /// Native column descriptors, in on-disk order.
    fn columns(&self) -> &[ColumnInfo];

    /// Total number of rows in the unit.
    fn num_rows(&self) -> u64;

    /// Decode the rows in `rows`, keeping only the cells of the columns at
    /// the given native indices, in that order.
    ///
    /// Only the requested window is decoded; memory use is proportional to
    /// `rows.len() * columns.len()`.
    fn read_rows(&self, rows: Range<u64>, columns: &[usize]) -> Result<Vec<Vec<CellValue>>>;

    /// Native column names, in order.
    fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name.clone()).collect()
    }
}
