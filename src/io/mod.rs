// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for scientific container files.
//!
//! This module provides the foundational types and traits for reading
//! tabular units out of a container.

pub mod arena;
pub mod detection;
pub mod formats;
pub mod metadata;

// Re-exports
pub use arena::MmapArena;
pub use detection::{detect_format, is_fits_file};
pub use metadata::{ColumnInfo, FileFormat, UnitInfo, UnitKind};

// Trait for tabular unit readers
pub mod traits;
pub use traits::TableSource;

// Column allow-list filtering
pub mod filter;
pub use filter::ColumnFilter;
