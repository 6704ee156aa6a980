// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Column layout and cell decoding for table HDUs.
//!
//! Both table flavours share one row-major layout: `NAXIS2` rows of
//! `NAXIS1` bytes each. A [`TableLayout`] is built once from the header and
//! then decodes any row window straight out of the mapped data segment.
//!
//! - **BINTABLE** fields are packed big-endian binary, described by
//!   `TFORMn = rT[a]`.
//! - **TABLE** (ASCII) fields are fixed-width text at `TBCOLn`, described
//!   by Fortran-style `TFORMn = Tw[.d]`.

use std::ops::Range;
use std::sync::OnceLock;

use byteorder::{BigEndian, ByteOrder};
use regex::Regex;
use tracing::{debug, warn};

use crate::core::{widen_f32, CellValue, FitsError, Result, ScalarType};
use crate::io::metadata::ColumnInfo;
use crate::io::traits::TableSource;

use super::header::{parse_real, Header};

fn binary_tform_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d*)\s*([LXBIJKAEDCMPQ])(.*)$").ok())
        .as_ref()
}

fn ascii_tform_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([AIFED])\s*(\d+)(?:\.(\d+))?\s*$").ok())
        .as_ref()
}

/// Linear scaling `physical = zero + scale * stored`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scaling {
    scale: f64,
    zero: f64,
}

impl Scaling {
    fn from_header(header: &Header, n: usize) -> Self {
        Self {
            scale: header.get_float(&format!("TSCAL{n}")).unwrap_or(1.0),
            zero: header.get_float(&format!("TZERO{n}")).unwrap_or(0.0),
        }
    }

    fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.zero == 0.0
    }

    /// Integer offset, when the scaling keeps integers integral.
    ///
    /// Covers the unsigned conventions (`TZERO = 32768` on `I` and so on).
    fn integer_offset(&self) -> Option<i128> {
        let in_range = self.zero.abs() <= 2f64.powi(64);
        (self.scale == 1.0 && self.zero.fract() == 0.0 && in_range).then(|| self.zero as i128)
    }

    fn integer_type(&self) -> ScalarType {
        if self.integer_offset().is_some() {
            ScalarType::Integer
        } else {
            ScalarType::Float
        }
    }

    fn apply_integer(&self, raw: i64) -> CellValue {
        match self.integer_offset() {
            Some(0) => CellValue::Int(raw),
            Some(offset) => {
                let value = raw as i128 + offset;
                if let Ok(v) = i64::try_from(value) {
                    CellValue::Int(v)
                } else if let Ok(v) = u64::try_from(value) {
                    CellValue::UInt(v)
                } else {
                    CellValue::Float(value as f64)
                }
            }
            None => CellValue::Float(self.zero + self.scale * raw as f64),
        }
    }

    fn apply_float(&self, raw: f64) -> CellValue {
        if self.is_identity() {
            CellValue::Float(raw)
        } else {
            CellValue::Float(self.zero + self.scale * raw)
        }
    }
}

/// Binary table field type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryCode {
    Logical,
    Bit,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    ComplexFloat,
    ComplexDouble,
    VarArray32,
    VarArray64,
}

impl BinaryCode {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'L' => Self::Logical,
            'X' => Self::Bit,
            'B' => Self::Byte,
            'I' => Self::Short,
            'J' => Self::Int,
            'K' => Self::Long,
            'A' => Self::Char,
            'E' => Self::Float,
            'D' => Self::Double,
            'C' => Self::ComplexFloat,
            'M' => Self::ComplexDouble,
            'P' => Self::VarArray32,
            'Q' => Self::VarArray64,
            _ => return None,
        })
    }

    /// Bytes per element; bits are handled separately.
    fn element_size(&self) -> usize {
        match self {
            Self::Logical | Self::Byte | Self::Char | Self::Bit => 1,
            Self::Short => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double | Self::ComplexFloat | Self::VarArray32 => 8,
            Self::ComplexDouble | Self::VarArray64 => 16,
        }
    }

    /// Bytes taken by `repeat` elements, `None` on overflow.
    fn field_width(&self, repeat: usize) -> Option<usize> {
        match self {
            Self::Bit => Some(repeat.div_ceil(8)),
            _ => repeat.checked_mul(self.element_size()),
        }
    }
}

/// Decoder for one BINTABLE field.
#[derive(Debug, Clone)]
struct BinaryField {
    offset: usize,
    width: usize,
    repeat: usize,
    code: BinaryCode,
    /// String width for `A` fields (`TDIMn` first axis, else the repeat)
    char_width: usize,
    scaling: Scaling,
    null: Option<i64>,
}

impl BinaryField {
    fn elements(&self) -> usize {
        match self.code {
            BinaryCode::Char => self.repeat / self.char_width,
            _ => self.repeat,
        }
    }

    fn scalar_type(&self) -> ScalarType {
        match self.code {
            BinaryCode::Logical | BinaryCode::Bit => ScalarType::Boolean,
            BinaryCode::Byte if self.scaling.is_identity() => ScalarType::Byte,
            BinaryCode::Byte | BinaryCode::Short | BinaryCode::Int | BinaryCode::Long => {
                self.scaling.integer_type()
            }
            BinaryCode::Float | BinaryCode::Double => ScalarType::Float,
            BinaryCode::Char
            | BinaryCode::ComplexFloat
            | BinaryCode::ComplexDouble
            | BinaryCode::VarArray32
            | BinaryCode::VarArray64 => ScalarType::String,
        }
    }

    fn decode(&self, row: &[u8]) -> CellValue {
        let bytes = &row[self.offset..self.offset + self.width];

        let mut cells: Vec<CellValue> = match self.code {
            BinaryCode::Bit => (0..self.repeat)
                .map(|i| CellValue::Bool(bytes[i / 8] & (0x80 >> (i % 8)) != 0))
                .collect(),
            BinaryCode::Char => bytes
                .chunks_exact(self.char_width)
                .map(|chunk| CellValue::String(decode_text(chunk)))
                .collect(),
            _ => bytes
                .chunks_exact(self.code.element_size())
                .map(|element| self.decode_element(element))
                .collect(),
        };

        if cells.len() == 1 {
            cells.pop().unwrap_or(CellValue::Null)
        } else {
            CellValue::Array(cells)
        }
    }

    fn decode_element(&self, b: &[u8]) -> CellValue {
        match self.code {
            BinaryCode::Logical => match b[0] {
                b'T' => CellValue::Bool(true),
                b'F' => CellValue::Bool(false),
                _ => CellValue::Null,
            },
            BinaryCode::Byte => self.decode_integer(b[0] as i64),
            BinaryCode::Short => self.decode_integer(BigEndian::read_i16(b) as i64),
            BinaryCode::Int => self.decode_integer(BigEndian::read_i32(b) as i64),
            BinaryCode::Long => self.decode_integer(BigEndian::read_i64(b)),
            BinaryCode::Float => self.scaling.apply_float(widen_f32(BigEndian::read_f32(b))),
            BinaryCode::Double => self.scaling.apply_float(BigEndian::read_f64(b)),
            BinaryCode::ComplexFloat => CellValue::Complex(
                widen_f32(BigEndian::read_f32(&b[..4])),
                widen_f32(BigEndian::read_f32(&b[4..])),
            ),
            BinaryCode::ComplexDouble => {
                CellValue::Complex(BigEndian::read_f64(&b[..8]), BigEndian::read_f64(&b[8..]))
            }
            BinaryCode::VarArray32 => CellValue::VarArray {
                len: BigEndian::read_u32(&b[..4]) as u64,
                offset: BigEndian::read_u32(&b[4..]) as u64,
            },
            BinaryCode::VarArray64 => CellValue::VarArray {
                len: BigEndian::read_u64(&b[..8]),
                offset: BigEndian::read_u64(&b[8..]),
            },
            // Handled per field in `decode`
            BinaryCode::Bit | BinaryCode::Char => CellValue::Null,
        }
    }

    fn decode_integer(&self, raw: i64) -> CellValue {
        if self.null == Some(raw) {
            return CellValue::Null;
        }
        self.scaling.apply_integer(raw)
    }
}

/// ASCII table field type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AsciiCode {
    Char,
    Integer,
    Real,
}

/// Decoder for one ASCII TABLE field.
#[derive(Debug, Clone)]
struct AsciiField {
    start: usize,
    width: usize,
    code: AsciiCode,
    scaling: Scaling,
    null: Option<String>,
}

impl AsciiField {
    fn scalar_type(&self) -> ScalarType {
        match self.code {
            AsciiCode::Char => ScalarType::String,
            AsciiCode::Integer => self.scaling.integer_type(),
            AsciiCode::Real => ScalarType::Float,
        }
    }

    fn decode(&self, row: &[u8], name: &str, row_index: u64) -> Result<CellValue> {
        let text = decode_text(&row[self.start..self.start + self.width]);
        if self.code == AsciiCode::Char {
            return Ok(CellValue::String(text));
        }

        let trimmed = text.trim();
        if trimmed.is_empty() || self.null.as_deref().map(str::trim) == Some(trimmed) {
            return Ok(CellValue::Null);
        }

        let unparseable = || {
            FitsError::decode(
                "column",
                format!("column '{name}' row {row_index}: cannot parse '{trimmed}' as a number"),
            )
        };

        match self.code {
            AsciiCode::Integer => trimmed
                .parse::<i64>()
                .map(|raw| self.scaling.apply_integer(raw))
                .map_err(|_| unparseable()),
            _ => parse_real(trimmed)
                .map(|raw| self.scaling.apply_float(raw))
                .ok_or_else(unparseable),
        }
    }
}

#[derive(Debug, Clone)]
enum FieldCodec {
    Binary(BinaryField),
    Ascii(AsciiField),
}

/// Decoded column layout of a table HDU.
#[derive(Debug, Clone)]
pub struct TableLayout {
    row_len: usize,
    rows: u64,
    columns: Vec<ColumnInfo>,
    codecs: Vec<FieldCodec>,
}

impl TableLayout {
    /// Build the layout of a BINTABLE from its header.
    ///
    /// # Errors
    ///
    /// Returns a `Decode` error for a missing or malformed `TFORMn`, or when
    /// the fields do not fit in `NAXIS1`.
    pub fn binary(header: &Header) -> Result<Self> {
        let (row_len, rows, fields) = table_shape(header)?;
        let mut columns = Vec::with_capacity(fields);
        let mut codecs = Vec::with_capacity(fields);
        let mut offset = 0usize;

        for n in 1..=fields {
            let name = column_name(header, n);
            let tform = require_tform(header, n)?;
            let caps = binary_tform_regex()
                .and_then(|re| re.captures(tform))
                .ok_or_else(|| {
                FitsError::decode("table", format!("invalid TFORM{n} '{tform}'"))
            })?;

            let repeat = match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
                "" => 1,
                digits => digits.parse::<usize>().map_err(|_| {
                    FitsError::decode("table", format!("invalid repeat in TFORM{n} '{tform}'"))
                })?,
            };
            let code = caps
                .get(2)
                .and_then(|m| m.as_str().chars().next())
                .and_then(BinaryCode::from_char)
                .ok_or_else(|| {
                    FitsError::decode("table", format!("invalid type in TFORM{n} '{tform}'"))
                })?;

            let too_wide =
                || FitsError::decode("table", format!("TFORM{n} '{tform}' is too wide"));
            let width = code.field_width(repeat).ok_or_else(too_wide)?;
            let field_offset = offset;
            offset = offset.checked_add(width).ok_or_else(too_wide)?;

            if repeat == 0 {
                debug!(
                    context = "table_layout",
                    column = %name,
                    "Skipping zero-width column"
                );
                continue;
            }

            let char_width = if code == BinaryCode::Char {
                string_width(header, n, repeat)
            } else {
                repeat
            };

            let field = BinaryField {
                offset: field_offset,
                width,
                repeat,
                code,
                char_width,
                scaling: Scaling::from_header(header, n),
                null: header.get_int(&format!("TNULL{n}")),
            };

            columns.push(column_info(header, n, name, field.scalar_type(), field.elements()));
            codecs.push(FieldCodec::Binary(field));
        }

        if offset > row_len {
            return Err(FitsError::decode(
                "table",
                format!("fields need {offset} bytes per row but NAXIS1 is {row_len}"),
            ));
        }

        Ok(Self {
            row_len,
            rows,
            columns,
            codecs,
        })
    }

    /// Build the layout of an ASCII TABLE from its header.
    ///
    /// # Errors
    ///
    /// Returns a `Decode` error for a missing `TBCOLn`, a malformed
    /// `TFORMn`, or a field running past `NAXIS1`.
    pub fn ascii(header: &Header) -> Result<Self> {
        let (row_len, rows, fields) = table_shape(header)?;
        let mut columns = Vec::with_capacity(fields);
        let mut codecs = Vec::with_capacity(fields);

        for n in 1..=fields {
            let name = column_name(header, n);
            let tform = require_tform(header, n)?;
            let caps = ascii_tform_regex()
                .and_then(|re| re.captures(tform))
                .ok_or_else(|| {
                FitsError::decode("table", format!("invalid TFORM{n} '{tform}'"))
            })?;

            let code = match caps.get(1).map(|m| m.as_str()) {
                Some("A") => AsciiCode::Char,
                Some("I") => AsciiCode::Integer,
                _ => AsciiCode::Real,
            };
            let width = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .ok_or_else(|| {
                    FitsError::decode("table", format!("invalid width in TFORM{n} '{tform}'"))
                })?;

            let tbcol = header.require_int(&format!("TBCOL{n}"))?;
            if tbcol < 1 {
                return Err(FitsError::decode(
                    "table",
                    format!("TBCOL{n} must be at least 1, got {tbcol}"),
                ));
            }
            let start = usize::try_from(tbcol - 1).map_err(|_| {
                FitsError::decode("table", format!("TBCOL{n} {tbcol} is out of range"))
            })?;
            let end = start.checked_add(width).ok_or_else(|| {
                FitsError::decode("table", format!("TFORM{n} '{tform}' is too wide"))
            })?;
            if end > row_len {
                return Err(FitsError::decode(
                    "table",
                    format!("column '{name}' ends at byte {end} but NAXIS1 is {row_len}"),
                ));
            }

            let field = AsciiField {
                start,
                width,
                code,
                scaling: Scaling::from_header(header, n),
                null: header.get_text(&format!("TNULL{n}")),
            };

            columns.push(column_info(header, n, name, field.scalar_type(), 1));
            codecs.push(FieldCodec::Ascii(field));
        }

        Ok(Self {
            row_len,
            rows,
            columns,
            codecs,
        })
    }

    /// Bytes per row (`NAXIS1`).
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Number of rows (`NAXIS2`).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Decoded column descriptors.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Size of the row-major main table in bytes.
    pub fn main_table_len(&self) -> Option<usize> {
        usize::try_from(self.rows).ok()?.checked_mul(self.row_len)
    }
}

/// `(NAXIS1, NAXIS2, TFIELDS)` of a table header.
fn table_shape(header: &Header) -> Result<(usize, u64, usize)> {
    let row_len = header.require_int("NAXIS1")?;
    let rows = header.require_int("NAXIS2")?;
    let fields = header.require_int("TFIELDS")?;

    if row_len < 0 || rows < 0 || !(0..=999).contains(&fields) {
        return Err(FitsError::decode(
            "table",
            format!("invalid table shape NAXIS1={row_len} NAXIS2={rows} TFIELDS={fields}"),
        ));
    }

    Ok((row_len as usize, rows as u64, fields as usize))
}

fn column_name(header: &Header, n: usize) -> String {
    header
        .get_str(&format!("TTYPE{n}"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("col{n}"))
}

fn require_tform(header: &Header, n: usize) -> Result<&str> {
    header
        .get_str(&format!("TFORM{n}"))
        .ok_or_else(|| FitsError::decode("table", format!("missing TFORM{n}")))
}

fn column_info(
    header: &Header,
    n: usize,
    name: String,
    scalar_type: ScalarType,
    elements: usize,
) -> ColumnInfo {
    let info = ColumnInfo::new(name, scalar_type).with_dimensionality(elements);
    match header
        .get_str(&format!("TUNIT{n}"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(unit) => info.with_unit(unit),
        None => info,
    }
}

/// Width of each string in an `rA` field.
///
/// `TDIMn = (w, n, ...)` splits the field into strings of width `w`; without
/// it the whole field is one string.
fn string_width(header: &Header, n: usize, repeat: usize) -> usize {
    let Some(tdim) = header.get_str(&format!("TDIM{n}")) else {
        return repeat;
    };

    let dims: Option<Vec<usize>> = tdim
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|d| d.trim().parse::<usize>().ok())
        .collect();

    match dims.as_deref() {
        Some([width, rest @ ..]) if !rest.is_empty() && *width > 0 && repeat % width == 0 => {
            *width
        }
        Some([_]) => repeat,
        _ => {
            warn!(
                context = "table_layout",
                keyword = %format!("TDIM{n}"),
                value = %tdim,
                "Ignoring TDIM that does not match the field width"
            );
            repeat
        }
    }
}

/// Text of a fixed-width field: cut at the first NUL, trailing blanks removed.
fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

/// A table HDU bound to its data segment.
///
/// Implements [`TableSource`] by decoding rows straight out of the mapped
/// file; nothing is copied until a window is read.
#[derive(Debug)]
pub struct FitsTable<'a> {
    layout: TableLayout,
    data: &'a [u8],
}

impl<'a> FitsTable<'a> {
    /// Bind a layout to the bytes of its main table.
    ///
    /// # Errors
    ///
    /// Returns a `Decode` error if `data` is shorter than
    /// `NAXIS1 * NAXIS2` bytes.
    pub fn new(layout: TableLayout, data: &'a [u8]) -> Result<Self> {
        let needed = layout.main_table_len().ok_or_else(|| {
            FitsError::decode("table", "table size overflows the address space")
        })?;
        if data.len() < needed {
            return Err(FitsError::decode(
                "table",
                format!(
                    "table needs {needed} bytes but the data segment holds {}",
                    data.len()
                ),
            ));
        }

        Ok(Self {
            layout,
            data: &data[..needed],
        })
    }
}

impl TableSource for FitsTable<'_> {
    fn columns(&self) -> &[ColumnInfo] {
        self.layout.columns()
    }

    fn num_rows(&self) -> u64 {
        self.layout.rows()
    }

    fn read_rows(&self, rows: Range<u64>, columns: &[usize]) -> Result<Vec<Vec<CellValue>>> {
        if rows.start > rows.end || rows.end > self.layout.rows() {
            return Err(FitsError::invalid_argument(
                "rows",
                format!(
                    "window {}..{} is outside the table's {} rows",
                    rows.start,
                    rows.end,
                    self.layout.rows()
                ),
            ));
        }
        if let Some(&bad) = columns.iter().find(|&&c| c >= self.layout.codecs.len()) {
            return Err(FitsError::invalid_argument(
                "columns",
                format!("column index {bad} is out of range"),
            ));
        }

        let row_len = self.layout.row_len();
        let mut out = Vec::with_capacity((rows.end - rows.start) as usize);

        for row_index in rows {
            let start = row_index as usize * row_len;
            let row = &self.data[start..start + row_len];

            let mut cells = Vec::with_capacity(columns.len());
            for &c in columns {
                let cell = match &self.layout.codecs[c] {
                    FieldCodec::Binary(field) => field.decode(row),
                    FieldCodec::Ascii(field) => {
                        field.decode(row, &self.layout.columns[c].name, row_index)?
                    }
                };
                cells.push(cell);
            }
            out.push(cells);
        }

        Ok(out)
    }
}
