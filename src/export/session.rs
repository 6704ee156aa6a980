// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunked export session.
//!
//! An [`ExportSession`] is a lazy, single-pass iterator of protocol
//! messages for one table: the schema message, then one data message per
//! window of `chunk_size` rows. Only the current window is ever decoded.
//! A window that fails to decode yields one error message and ends the
//! sequence; messages already yielded stand.

use tracing::{debug, warn};

use crate::core::{FitsError, Result};
use crate::io::traits::TableSource;

use super::config::ExportOptions;
use super::limits::compute_limits;
use super::message::{DataMessage, ErrorMessage, Message, SchemaMessage};
use super::schema::{derive_schema, Flattener, Schema};

#[derive(Debug)]
enum State {
    Schema(SchemaMessage),
    Streaming,
    Done,
}

/// Ephemeral state of one streaming export.
pub struct ExportSession<'a> {
    table: &'a dyn TableSource,
    selected: Vec<usize>,
    flattener: Flattener,
    total_rows: u64,
    chunk_size: u64,
    cursor: u64,
    state: State,
    error: Option<FitsError>,
}

impl<'a> ExportSession<'a> {
    /// Prepare an export: resolve the allow-list, apply caps, and derive
    /// the schema from a one-row probe.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero chunk size or an unknown
    /// allow-listed column, and any decode error raised by the probe.
    /// Nothing has been emitted when this fails.
    pub fn new(table: &'a dyn TableSource, options: &ExportOptions) -> Result<Self> {
        options.validate()?;

        let mut selected = options.columns.resolve(table.columns())?;
        let names: Vec<String> = selected
            .iter()
            .map(|&i| table.columns()[i].name.clone())
            .collect();

        let limits = compute_limits(table.num_rows(), &names, options.max_rows, options.max_cols);
        selected.truncate(limits.columns.len());

        let flattener = derive_schema(table, &selected)?;
        let schema_message = SchemaMessage {
            schema: flattener.schema().clone(),
            data: Vec::new(),
            warning: limits.warning,
            total_rows: limits.effective_rows,
        };

        debug!(
            context = "export_session",
            total_rows = limits.effective_rows,
            native_columns = selected.len(),
            chunk_size = options.chunk_size,
            "Prepared export"
        );

        Ok(Self {
            table,
            selected,
            flattener,
            total_rows: limits.effective_rows,
            chunk_size: options.chunk_size as u64,
            cursor: 0,
            state: State::Schema(schema_message),
            error: None,
        })
    }

    /// Rows this session will export.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Rows emitted so far.
    pub fn progress(&self) -> u64 {
        self.cursor
    }

    /// The flattened schema.
    pub fn schema(&self) -> &Schema {
        self.flattener.schema()
    }

    /// The error that ended the stream, if any.
    pub fn error(&self) -> Option<&FitsError> {
        self.error.as_ref()
    }

    /// Consume the session, returning the error that ended it, if any.
    pub fn into_error(self) -> Option<FitsError> {
        self.error
    }

    fn next_window(&mut self) -> Message {
        let end = self.cursor.saturating_add(self.chunk_size).min(self.total_rows);

        match self.table.read_rows(self.cursor..end, &self.selected) {
            Ok(rows) => {
                let data = rows
                    .into_iter()
                    .map(|cells| self.flattener.flatten_row(cells))
                    .collect();
                self.cursor = end;
                debug!(
                    context = "export_session",
                    progress = end,
                    total_rows = self.total_rows,
                    "Emitted window"
                );
                Message::Data(DataMessage {
                    data,
                    progress: end,
                })
            }
            Err(err) => {
                warn!(
                    context = "export_session",
                    start = self.cursor,
                    end,
                    kind = err.kind(),
                    error = %err,
                    "Window read failed; ending stream"
                );
                let message = Message::Error(ErrorMessage::from(&err));
                self.error = Some(err);
                self.state = State::Done;
                message
            }
        }
    }
}

impl Iterator for ExportSession<'_> {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        match std::mem::replace(&mut self.state, State::Streaming) {
            State::Schema(message) => Some(Message::Schema(message)),
            State::Streaming if self.cursor < self.total_rows => Some(self.next_window()),
            State::Streaming | State::Done => {
                self.state = State::Done;
                None
            }
        }
    }
}

impl std::fmt::Debug for ExportSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSession")
            .field("selected", &self.selected)
            .field("total_rows", &self.total_rows)
            .field("chunk_size", &self.chunk_size)
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .finish()
    }
}
