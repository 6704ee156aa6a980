// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Export configuration.

use crate::core::{FitsError, Result};
use crate::io::filter::ColumnFilter;

/// Default number of rows per data message.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Options controlling one streaming export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Rows per data message
    pub chunk_size: usize,
    /// Row cap; `<= 0` means unlimited
    pub max_rows: i64,
    /// Native column cap; `<= 0` means unlimited
    pub max_cols: i64,
    /// Column allow-list (native names)
    pub columns: ColumnFilter,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_rows: 0,
            max_cols: 0,
            columns: ColumnFilter::All,
        }
    }
}

impl ExportOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of rows per data message.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the row cap.
    pub fn with_max_rows(mut self, max_rows: i64) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the native column cap.
    pub fn with_max_cols(mut self, max_cols: i64) -> Self {
        self.max_cols = max_cols;
        self
    }

    /// Restrict the export to the named columns.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = ColumnFilter::include(columns);
        self
    }

    /// Check the options before any data is read.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero chunk size.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FitsError::invalid_argument(
                "chunk_size",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
