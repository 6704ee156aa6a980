// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! FITS format constants.
//!
//! Sizes and reserved keywords as defined by the
//! [FITS standard](https://fits.gsfc.nasa.gov/fits_standard.html), kept in
//! one place so the header parser and the HDU walk agree on framing.

/// Logical record size; headers and data segments are padded to this.
pub const BLOCK_SIZE: usize = 2880;

/// Size of one header card.
pub const CARD_SIZE: usize = 80;

/// Number of cards in one header block.
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Width of the keyword field (columns 1-8).
pub const KEYWORD_LEN: usize = 8;

/// Magic bytes opening every FITS file (keyword plus value indicator).
pub const SIMPLE_MAGIC: &[u8] = b"SIMPLE  =";

/// Keyword that opens every extension header.
pub const XTENSION_MAGIC: &[u8] = b"XTENSION=";

/// Value indicator in columns 9-10 of a valued card.
pub const VALUE_INDICATOR: &[u8] = b"= ";

/// Keyword terminating a header.
pub const END_KEYWORD: &str = "END";

/// XTENSION value of an image extension.
pub const XT_IMAGE: &str = "IMAGE";
/// XTENSION value of an ASCII table extension.
pub const XT_TABLE: &str = "TABLE";
/// XTENSION value of a binary table extension.
pub const XT_BINTABLE: &str = "BINTABLE";

/// Name reported for HDU 0 when it carries no EXTNAME.
pub const PRIMARY_NAME: &str = "PRIMARY";

/// Round `len` up to the next multiple of [`BLOCK_SIZE`].
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}
