// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for fitstream.
//!
//! Every failure the exporter can hit maps onto one of a handful of
//! categories:
//! - File lookup (`NotFound`)
//! - Structural decoding of the container (`Decode`)
//! - Unit selection (`IndexOutOfBounds`, `NotATable`)
//! - Caller input (`InvalidArgument`, `UnknownColumn`)
//! - Writing the output stream (`Output`)

use std::fmt;

/// Errors that can occur while inspecting or exporting a container.
#[derive(Debug, Clone, PartialEq)]
pub enum FitsError {
    /// Path does not exist or cannot be read
    NotFound {
        /// The path that was requested
        path: String,
    },

    /// Container bytes are structurally invalid
    Decode {
        /// What was being decoded (header, table layout, column...)
        context: String,
        /// Error message
        message: String,
    },

    /// Requested unit index is outside the enumerated range
    IndexOutOfBounds {
        /// Requested index (may be negative when it came from the command line)
        index: i64,
        /// Number of units in the container
        count: usize,
    },

    /// Requested unit has no tabular capability
    NotATable {
        /// Unit index
        index: usize,
        /// Unit name
        name: String,
        /// Unit kind tag
        kind: String,
    },

    /// Caller supplied a malformed argument
    InvalidArgument {
        /// Argument name
        argument: String,
        /// Why it was rejected
        reason: String,
    },

    /// Column allow-list names a column the unit does not have
    UnknownColumn {
        /// The unknown column name
        name: String,
    },

    /// Writing to the output stream failed
    Output {
        /// Error message
        message: String,
    },
}

impl FitsError {
    /// Create a "file not found" error.
    pub fn not_found(path: impl Into<String>) -> Self {
        FitsError::NotFound { path: path.into() }
    }

    /// Create a decode error.
    pub fn decode(context: impl Into<String>, message: impl Into<String>) -> Self {
        FitsError::Decode {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an index out of bounds error.
    pub fn index_out_of_bounds(index: i64, count: usize) -> Self {
        FitsError::IndexOutOfBounds { index, count }
    }

    /// Create a "not a table" error.
    pub fn not_a_table(index: usize, name: impl Into<String>, kind: impl Into<String>) -> Self {
        FitsError::NotATable {
            index,
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        FitsError::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown column error.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        FitsError::UnknownColumn { name: name.into() }
    }

    /// Create an output error.
    pub fn output(message: impl Into<String>) -> Self {
        FitsError::Output {
            message: message.into(),
        }
    }

    /// Stable category name, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            FitsError::NotFound { .. } => "not_found",
            FitsError::Decode { .. } => "decode_error",
            FitsError::IndexOutOfBounds { .. } => "index_out_of_bounds",
            FitsError::NotATable { .. } => "not_a_table",
            FitsError::InvalidArgument { .. } | FitsError::UnknownColumn { .. } => {
                "invalid_argument"
            }
            FitsError::Output { .. } => "output",
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            FitsError::NotFound { path } => vec![("path", path.clone())],
            FitsError::Decode { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            FitsError::IndexOutOfBounds { index, count } => vec![
                ("index", index.to_string()),
                ("count", count.to_string()),
            ],
            FitsError::NotATable { index, name, kind } => vec![
                ("index", index.to_string()),
                ("name", name.clone()),
                ("kind", kind.clone()),
            ],
            FitsError::InvalidArgument { argument, reason } => {
                vec![("argument", argument.clone()), ("reason", reason.clone())]
            }
            FitsError::UnknownColumn { name } => vec![("column", name.clone())],
            FitsError::Output { message } => vec![("message", message.clone())],
        }
    }
}

impl fmt::Display for FitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitsError::NotFound { path } => write!(f, "File not found: {path}"),
            FitsError::Decode { context, message } => {
                write!(f, "Failed to read FITS file ({context}): {message}")
            }
            FitsError::IndexOutOfBounds { index, count } => write!(
                f,
                "Unit index {index} is out of bounds (file has {count} units)"
            ),
            FitsError::NotATable { index, name, kind } => {
                write!(f, "Unit {index} ('{name}', {kind}) is not a table")
            }
            FitsError::InvalidArgument { argument, reason } => {
                write!(f, "Invalid argument '{argument}': {reason}")
            }
            FitsError::UnknownColumn { name } => write!(f, "Unknown column: '{name}'"),
            FitsError::Output { message } => write!(f, "Failed to write output: {message}"),
        }
    }
}

impl std::error::Error for FitsError {}

impl From<std::io::Error> for FitsError {
    fn from(err: std::io::Error) -> Self {
        FitsError::Output {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FitsError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            FitsError::Output {
                message: err.to_string(),
            }
        } else {
            FitsError::decode("json", err.to_string())
        }
    }
}

/// Result type for fitstream operations.
pub type Result<T> = std::result::Result<T, FitsError>;
