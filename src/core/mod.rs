// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout fitstream.
//!
//! This module provides the foundational types for the library:
//! - [`FitsError`] - Error taxonomy shared by the reader and the exporter
//! - [`CellValue`] - Unified decoded cell representation
//! - [`ScalarType`] - Column element type

pub mod error;
pub mod value;

pub use error::{FitsError, Result};
pub use value::{widen_f32, CellValue, ScalarType};
