// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Column filtering for table exports.
//!
//! A filter selects native (pre-flattening) columns by name. Selection
//! always preserves the unit's native column order, never the order in
//! which names were supplied.

use crate::core::{FitsError, Result};
use crate::io::metadata::ColumnInfo;

/// Filter for selecting columns during export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Export all columns (no filtering)
    #[default]
    All,
    /// Export only the named columns
    Include(Vec<String>),
}

impl ColumnFilter {
    /// Create an include filter from column names.
    ///
    /// An empty list means no filtering.
    pub fn include(columns: Vec<String>) -> Self {
        if columns.is_empty() {
            Self::All
        } else {
            Self::Include(columns)
        }
    }

    /// Check if a column should be included.
    pub fn should_include(&self, column: &str) -> bool {
        match self {
            ColumnFilter::All => true,
            ColumnFilter::Include(columns) => columns.iter().any(|c| c == column),
        }
    }

    /// Resolve the filter against a unit's columns.
    ///
    /// Returns the native indices of the selected columns in native order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` for the first allow-listed name the unit
    /// does not have.
    pub fn resolve(&self, columns: &[ColumnInfo]) -> Result<Vec<usize>> {
        if let ColumnFilter::Include(names) = self {
            if let Some(missing) = names
                .iter()
                .find(|name| !columns.iter().any(|c| &c.name == *name))
            {
                return Err(FitsError::unknown_column(missing.clone()));
            }
        }

        Ok(columns
            .iter()
            .enumerate()
            .filter(|(_, c)| self.should_include(&c.name))
            .map(|(i, _)| i)
            .collect())
    }
}
