// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared metadata types describing a container and its units.
//!
//! These are the lightweight descriptors produced by inspection: computed
//! once from structural headers, never from row data.

use serde::Serialize;

use crate::core::ScalarType;

/// Kind of a data unit, computed once at inspection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Primary HDU (array or empty)
    Primary,
    /// Primary HDU in random-groups layout
    RandomGroups,
    /// IMAGE extension
    Image,
    /// ASCII TABLE extension
    AsciiTable,
    /// BINTABLE extension
    BinaryTable,
    /// Tile-compressed image stored as a BINTABLE
    CompressedImage,
    /// Any other conforming extension
    Foreign,
}

impl UnitKind {
    /// Whether units of this kind expose columns and rows.
    pub fn is_table(&self) -> bool {
        matches!(self, UnitKind::AsciiTable | UnitKind::BinaryTable)
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Primary => "primary",
            UnitKind::RandomGroups => "random_groups",
            UnitKind::Image => "image",
            UnitKind::AsciiTable => "ascii_table",
            UnitKind::BinaryTable => "binary_table",
            UnitKind::CompressedImage => "compressed_image",
            UnitKind::Foreign => "foreign",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of one unit in a container.
///
/// Serialized as one element of the `info` manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitInfo {
    /// 0-based position in the container
    pub index: usize,
    /// Unit name (`EXTNAME`, `PRIMARY`, or `Unit {index}`)
    pub name: String,
    /// Tabular capability flag
    pub is_table: bool,
    /// Kind tag
    pub kind: UnitKind,
    /// Row count, for tabular units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    /// Native column count, for tabular units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
}

impl UnitInfo {
    /// Create a new UnitInfo; `is_table` follows the kind.
    pub fn new(index: usize, name: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            index,
            name: name.into(),
            is_table: kind.is_table(),
            kind,
            rows: None,
            columns: None,
        }
    }

    /// Set the table dimensions.
    pub fn with_table_shape(mut self, rows: u64, columns: usize) -> Self {
        self.rows = Some(rows);
        self.columns = Some(columns);
        self
    }

    /// Name used when a unit carries none.
    pub fn default_name(index: usize) -> String {
        format!("Unit {index}")
    }
}

/// Native (pre-flattening) description of a table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Column name, as declared by the unit
    pub name: String,
    /// Element type
    pub scalar_type: ScalarType,
    /// 1 for scalar cells, k > 1 for fixed-width array cells
    pub dimensionality: usize,
    /// Physical unit, if declared
    pub unit: Option<String>,
}

impl ColumnInfo {
    /// Create a scalar column.
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
            dimensionality: 1,
            unit: None,
        }
    }

    /// Set the array width.
    pub fn with_dimensionality(mut self, dimensionality: usize) -> Self {
        self.dimensionality = dimensionality;
        self
    }

    /// Set the physical unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Check if cells of this column are fixed-width arrays.
    pub fn is_array(&self) -> bool {
        self.dimensionality > 1
    }
}

/// Detected file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// FITS container
    Fits,
    /// Unknown format
    Unknown,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fits => write!(f, "FITS"),
            FileFormat::Unknown => write!(f, "Unknown"),
        }
    }
}
