// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Data command - stream one table unit.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::common::{stdout_writer, AlreadyReported, ProgressBar, Result};
use fitstream::export::{export_unit, ExportOptions, Message, DEFAULT_CHUNK_SIZE};
use fitstream::FitsError;

/// Stream one table unit as NDJSON messages.
#[derive(Args, Clone, Debug)]
pub struct DataCmd {
    /// Input FITS file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// 0-based index of the unit to export
    #[arg(value_name = "UNIT_INDEX", allow_negative_numbers = true)]
    unit_index: String,

    /// Export at most N rows (0 or less: unlimited)
    #[arg(long, value_name = "N", default_value_t = 0, allow_negative_numbers = true)]
    max_rows: i64,

    /// Export at most the first N columns (0 or less: unlimited)
    #[arg(long, value_name = "N", default_value_t = 0, allow_negative_numbers = true)]
    max_cols: i64,

    /// Rows per data message
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Only export these columns (comma separated, original names)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    columns: Vec<String>,
}

impl DataCmd {
    pub fn run(self, show_progress: bool) -> Result<()> {
        let index = parse_unit_index(&self.unit_index)?;
        let options = ExportOptions::new()
            .with_chunk_size(self.chunk_size)
            .with_max_rows(self.max_rows)
            .with_max_cols(self.max_cols)
            .with_columns(self.columns);

        let stdout = std::io::stdout();
        let mut out = stdout_writer(&stdout);
        let mut bar: Option<ProgressBar> = None;

        let summary = export_unit(&self.input, index, &options, &mut out, |message| {
            match message {
                Message::Schema(schema) if show_progress => {
                    bar = Some(ProgressBar::new(schema.total_rows, "rows"));
                }
                Message::Data(data) => {
                    if let Some(pb) = &bar {
                        pb.set_position(data.progress);
                    }
                }
                _ => {}
            }
        })?;

        debug!(
            context = "data_cmd",
            messages = summary.messages,
            rows = summary.rows_written,
            "Stream closed"
        );

        match summary.error {
            Some(_) => {
                if let Some(pb) = &bar {
                    pb.abandon();
                }
                Err(AlreadyReported.into())
            }
            None => {
                if let Some(pb) = &bar {
                    pb.finish_with_message(format!("{} rows", summary.rows_written));
                }
                Ok(())
            }
        }
    }
}

/// Parse the unit index argument.
fn parse_unit_index(raw: &str) -> std::result::Result<i64, FitsError> {
    raw.trim().parse::<i64>().map_err(|_| {
        FitsError::invalid_argument("unit_index", format!("must be an integer, got '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_index() {
        assert_eq!(parse_unit_index("3").unwrap(), 3);
        assert_eq!(parse_unit_index("-1").unwrap(), -1);
        assert_eq!(
            parse_unit_index("abc").unwrap_err().to_string(),
            "Invalid argument 'unit_index': must be an integer, got 'abc'"
        );
    }
}
