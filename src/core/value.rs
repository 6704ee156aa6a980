// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cell value type system.
//!
//! Provides a unified value representation for decoded table cells, whatever
//! the on-disk column encoding. Scalars map directly onto JSON; values JSON
//! cannot represent natively (complex numbers, variable-length array
//! descriptors) are emitted through their string form.

use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

/// Scalar type of a column after decoding.
///
/// This is the type of each element; array cells carry it per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Signed or unsigned integer
    Integer,
    /// Floating point
    Float,
    /// Text (also used for string-fallback values)
    String,
    /// Logical
    Boolean,
    /// Unsigned 8-bit integer
    Byte,
}

impl ScalarType {
    /// Type name used in the exported table schema.
    pub fn table_schema_type(&self) -> &'static str {
        match self {
            ScalarType::Integer | ScalarType::Byte => "integer",
            ScalarType::Float => "number",
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
        }
    }
}

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Undefined or null-flagged value
    Null,

    /// Logical value
    Bool(bool),

    /// Signed integer (after scaling, when the scaled value is integral)
    Int(i64),

    /// Unsigned integer that does not fit in `i64`
    UInt(u64),

    /// Floating point
    Float(f64),

    /// Text
    String(String),

    /// Complex number (real, imaginary)
    Complex(f64, f64),

    /// Variable-length array descriptor (element count, heap offset)
    VarArray {
        /// Number of elements in the heap array
        len: u64,
        /// Byte offset into the heap
        offset: u64,
    },

    /// Fixed-width array cell
    Array(Vec<CellValue>),
}

impl CellValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Number of elements: the array length for array cells, 1 otherwise.
    pub fn width(&self) -> usize {
        match self {
            CellValue::Array(items) => items.len(),
            _ => 1,
        }
    }

    /// Split an array cell into its elements; a scalar yields itself.
    pub fn into_elements(self) -> Vec<CellValue> {
        match self {
            CellValue::Array(items) => items,
            other => vec![other],
        }
    }

    /// Convert to a JSON scalar.
    ///
    /// Non-finite floats become `null`. Complex numbers, variable-length
    /// descriptors and (unflattened) arrays use their string form; this is
    /// a lossy fallback.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Int(i) => Value::Number(Number::from(*i)),
            CellValue::UInt(u) => Value::Number(Number::from(*u)),
            CellValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Complex(..) | CellValue::VarArray { .. } | CellValue::Array(_) => {
                Value::String(self.to_string())
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::UInt(u) => write!(f, "{u}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Complex(re, im) => {
                if *im < 0.0 || (*im == 0.0 && im.is_sign_negative()) {
                    write!(f, "({re}-{}j)", -im)
                } else {
                    write!(f, "({re}+{im}j)")
                }
            }
            CellValue::VarArray { len, .. } => {
                write!(f, "<variable-length array: {len} elements>")
            }
            CellValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Widen a single-precision float to `f64` through its shortest decimal
/// representation, so `0.1f32` exports as `0.1` rather than
/// `0.10000000149011612`.
pub fn widen_f32(value: f32) -> f64 {
    if !value.is_finite() {
        return value as f64;
    }
    value.to_string().parse::<f64>().unwrap_or(value as f64)
}
