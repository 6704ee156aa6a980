// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire messages and the NDJSON writer.
//!
//! Every message is one JSON object on its own line, flushed as soon as it
//! is written so a consumer reading line by line sees it immediately.

use std::io::Write;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::{FitsError, Result};

use super::schema::Schema;

/// One flattened row: field name to JSON scalar.
pub type Row = Map<String, Value>;

/// First message of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaMessage {
    /// Flattened schema
    pub schema: Schema,
    /// Always empty; rows follow in data messages
    pub data: Vec<Row>,
    /// Truncation notice, `null` when no cap applied
    pub warning: Option<String>,
    /// Rows that will be exported
    pub total_rows: u64,
}

/// One window of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataMessage {
    /// Rows of this window
    pub data: Vec<Row>,
    /// Cumulative rows emitted, this window included
    pub progress: u64,
}

/// Terminal failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    /// Human-readable error
    pub error: String,
}

impl From<&FitsError> for ErrorMessage {
    fn from(err: &FitsError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Any message of the streaming protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    /// Schema message
    Schema(SchemaMessage),
    /// Data message
    Data(DataMessage),
    /// Error message
    Error(ErrorMessage),
}

impl Message {
    /// Check if this is an error message.
    pub fn is_error(&self) -> bool {
        matches!(self, Message::Error(_))
    }
}

/// Line-delimited JSON writer.
///
/// # Example
///
/// ```
/// use fitstream::export::message::{ErrorMessage, NdjsonWriter};
///
/// let mut writer = NdjsonWriter::new(Vec::new());
/// writer.write(&ErrorMessage { error: "boom".into() })?;
/// assert_eq!(writer.into_inner(), b"{\"error\":\"boom\"}\n");
/// # Ok::<(), fitstream::FitsError>(())
/// ```
#[derive(Debug)]
pub struct NdjsonWriter<W: Write> {
    inner: W,
    lines: usize,
}

impl<W: Write> NdjsonWriter<W> {
    /// Wrap an output stream.
    pub fn new(inner: W) -> Self {
        Self { inner, lines: 0 }
    }

    /// Write one value as a line and flush.
    ///
    /// # Errors
    ///
    /// Returns `Output` if writing or flushing fails.
    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.inner, value)?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        self.lines += 1;
        Ok(())
    }

    /// Write an error line.
    ///
    /// # Errors
    ///
    /// Returns `Output` if writing fails.
    pub fn write_error(&mut self, err: &FitsError) -> Result<()> {
        self.write(&ErrorMessage::from(err))
    }

    /// Number of lines written so far.
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Unwrap the output stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
