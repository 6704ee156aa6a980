// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! Fixtures are real FITS files assembled card by card and written to
//! temporary files, so every test exercises the full reader.

#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

pub const BLOCK: usize = 2880;

// ============================================================================
// Cards
// ============================================================================

/// Valued card with a right-aligned value (integers, reals, logicals).
pub fn kv(key: &str, value: impl std::fmt::Display) -> String {
    format!("{key:<8}= {value:>20}")
}

/// Valued card with a quoted string value.
pub fn kv_str(key: &str, value: &str) -> String {
    format!("{key:<8}= '{:<8}'", value.replace('\'', "''"))
}

/// Encode cards plus `END` as padded header blocks.
pub fn header(cards: &[String]) -> Vec<u8> {
    let mut text: String = cards.iter().map(|c| format!("{c:<80.80}")).collect();
    text.push_str(&format!("{:<80}", "END"));
    let mut bytes = text.into_bytes();
    pad(&mut bytes, b' ');
    bytes
}

fn pad(bytes: &mut Vec<u8>, fill: u8) {
    let len = bytes.len().div_ceil(BLOCK) * BLOCK;
    bytes.resize(len, fill);
}

// ============================================================================
// HDU builders
// ============================================================================

/// BINTABLE extension builder.
#[derive(Debug, Clone)]
pub struct BinTable {
    name: Option<String>,
    row_len: usize,
    fields: Vec<(String, String)>,
    cards: Vec<String>,
    rows: Vec<Vec<u8>>,
}

impl BinTable {
    pub fn new(name: Option<&str>, row_len: usize) -> Self {
        Self {
            name: name.map(str::to_string),
            row_len,
            fields: Vec::new(),
            cards: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, tform: &str) -> Self {
        self.fields.push((name.to_string(), tform.to_string()));
        self
    }

    pub fn card(mut self, card: String) -> Self {
        self.cards.push(card);
        self
    }

    pub fn row(mut self, bytes: Vec<u8>) -> Self {
        assert_eq!(bytes.len(), self.row_len, "row length mismatch");
        self.rows.push(bytes);
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut cards = vec![
            kv_str("XTENSION", "BINTABLE"),
            kv("BITPIX", 8),
            kv("NAXIS", 2),
            kv("NAXIS1", self.row_len),
            kv("NAXIS2", self.rows.len()),
            kv("PCOUNT", 0),
            kv("GCOUNT", 1),
            kv("TFIELDS", self.fields.len()),
        ];
        for (i, (name, tform)) in self.fields.iter().enumerate() {
            cards.push(kv_str(&format!("TTYPE{}", i + 1), name));
            cards.push(kv_str(&format!("TFORM{}", i + 1), tform));
        }
        if let Some(name) = &self.name {
            cards.push(kv_str("EXTNAME", name));
        }
        cards.extend(self.cards.iter().cloned());

        let mut bytes = header(&cards);
        let mut data: Vec<u8> = self.rows.concat();
        pad(&mut data, 0);
        bytes.extend(data);
        bytes
    }
}

/// ASCII TABLE extension builder; rows are fixed-width text lines.
#[derive(Debug, Clone)]
pub struct AsciiTable {
    name: Option<String>,
    row_len: usize,
    fields: Vec<(String, String, usize)>,
    rows: Vec<String>,
}

impl AsciiTable {
    pub fn new(name: Option<&str>, row_len: usize) -> Self {
        Self {
            name: name.map(str::to_string),
            row_len,
            fields: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Add a field starting at 1-based byte `tbcol`.
    pub fn column(mut self, name: &str, tform: &str, tbcol: usize) -> Self {
        self.fields.push((name.to_string(), tform.to_string(), tbcol));
        self
    }

    pub fn row(mut self, text: &str) -> Self {
        assert!(text.len() <= self.row_len, "row too long");
        self.rows.push(format!("{text:<width$}", width = self.row_len));
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut cards = vec![
            kv_str("XTENSION", "TABLE"),
            kv("BITPIX", 8),
            kv("NAXIS", 2),
            kv("NAXIS1", self.row_len),
            kv("NAXIS2", self.rows.len()),
            kv("PCOUNT", 0),
            kv("GCOUNT", 1),
            kv("TFIELDS", self.fields.len()),
        ];
        for (i, (name, tform, tbcol)) in self.fields.iter().enumerate() {
            cards.push(kv_str(&format!("TTYPE{}", i + 1), name));
            cards.push(kv_str(&format!("TFORM{}", i + 1), tform));
            cards.push(kv(&format!("TBCOL{}", i + 1), tbcol));
        }
        if let Some(name) = &self.name {
            cards.push(kv_str("EXTNAME", name));
        }

        let mut bytes = header(&cards);
        let mut data = self.rows.concat().into_bytes();
        pad(&mut data, b' ');
        bytes.extend(data);
        bytes
    }
}

/// Whole-file builder; starts with an empty primary HDU.
#[derive(Debug, Clone)]
pub struct FitsBuilder {
    bytes: Vec<u8>,
}

impl Default for FitsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitsBuilder {
    pub fn new() -> Self {
        let bytes = header(&[
            kv("SIMPLE", "T"),
            kv("BITPIX", 8),
            kv("NAXIS", 0),
            kv("EXTEND", "T"),
        ]);
        Self { bytes }
    }

    /// Append a 16-bit IMAGE extension of `width x height` zero pixels.
    pub fn image(mut self, name: Option<&str>, width: usize, height: usize) -> Self {
        let mut cards = vec![
            kv_str("XTENSION", "IMAGE"),
            kv("BITPIX", 16),
            kv("NAXIS", 2),
            kv("NAXIS1", width),
            kv("NAXIS2", height),
            kv("PCOUNT", 0),
            kv("GCOUNT", 1),
        ];
        if let Some(name) = name {
            cards.push(kv_str("EXTNAME", name));
        }
        self.bytes.extend(header(&cards));
        let mut data = vec![0u8; width * height * 2];
        pad(&mut data, 0);
        self.bytes.extend(data);
        self
    }

    pub fn bintable(mut self, table: &BinTable) -> Self {
        self.bytes.extend(table.encode());
        self
    }

    pub fn ascii_table(mut self, table: &AsciiTable) -> Self {
        self.bytes.extend(table.encode());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write(self) -> NamedTempFile {
        write_bytes(&self.bytes)
    }
}

/// Write raw bytes to a temporary `.fits` file.
pub fn write_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("fitstream_test_")
        .suffix(".fits")
        .tempfile()
        .unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// Standard fixtures
// ============================================================================

/// `CATALOG` table: `ID` (J), `POS` (3E, deg), `FLUX` (D), `NAME` (8A).
///
/// Row `i` holds `ID = i`, `POS = (i, i + 0.5, -i)`, `FLUX = 1.5 * i` and
/// `NAME = "SRC{i}"`.
pub fn catalog_table(rows: usize) -> BinTable {
    let mut table = BinTable::new(Some("CATALOG"), 4 + 12 + 8 + 8)
        .column("ID", "J")
        .column("POS", "3E")
        .column("FLUX", "D")
        .column("NAME", "8A")
        .card(kv_str("TUNIT2", "deg"));

    for i in 0..rows {
        let mut row = Vec::with_capacity(32);
        row.extend_from_slice(&(i as i32).to_be_bytes());
        for v in [i as f32, i as f32 + 0.5, -(i as f32)] {
            row.extend_from_slice(&v.to_be_bytes());
        }
        row.extend_from_slice(&(1.5 * i as f64).to_be_bytes());
        row.extend_from_slice(format!("{:<8}", format!("SRC{i}")).as_bytes());
        table = table.row(row);
    }
    table
}

/// Primary, an image named `SCI`, then the `CATALOG` table at index 2.
pub fn catalog_file(rows: usize) -> NamedTempFile {
    FitsBuilder::new()
        .image(Some("SCI"), 4, 4)
        .bintable(&catalog_table(rows))
        .write()
}

/// Primary plus an ASCII table at index 1 whose row `bad_row` holds an
/// unparseable number.
pub fn corrupt_ascii_file(rows: usize, bad_row: usize) -> NamedTempFile {
    let mut table = AsciiTable::new(Some("OBS"), 12)
        .column("NAME", "A6", 1)
        .column("COUNT", "I5", 8);
    for i in 0..rows {
        let count = if i == bad_row {
            "oops".to_string()
        } else {
            i.to_string()
        };
        table = table.row(&format!("{:<6} {count:>5}", format!("S{}", i % 1000)));
    }
    FitsBuilder::new().ascii_table(&table).write()
}

/// Parse NDJSON output into values, one per line.
pub fn parse_lines(output: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| {
            serde_json::from_str(line).unwrap_or_else(|e| panic!("bad JSON line {line:?}: {e}"))
        })
        .collect()
}
