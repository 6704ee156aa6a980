// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container format implementations.
//!
//! - [`fits`]: FITS (Flexible Image Transport System) support

pub mod fits;
