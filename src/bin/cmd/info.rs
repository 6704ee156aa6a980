// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Info command - list the units of a file.

use std::path::PathBuf;

use clap::Args;

use crate::common::{stdout_writer, Result};
use fitstream::export::inspect;

/// List every unit of a FITS file.
#[derive(Args, Clone, Debug)]
pub struct InfoCmd {
    /// Input FITS file
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

impl InfoCmd {
    pub fn run(self) -> Result<()> {
        let units = inspect(&self.input)?;

        let stdout = std::io::stdout();
        let mut out = stdout_writer(&stdout);
        out.write(&units)?;

        Ok(())
    }
}
