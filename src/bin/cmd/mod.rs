// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod data;
mod info;

pub use data::DataCmd;
pub use info::InfoCmd;
