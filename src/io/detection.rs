// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format detection using magic numbers and file analysis.
//!
//! A FITS file always opens with the card `SIMPLE  =` in its first 80
//! bytes, so the magic check is cheap and does not depend on the file
//! extension.
//!
//! # Example
//!
//! ```rust,no_run
//! use fitstream::io::detection::detect_format;
//! use fitstream::io::metadata::FileFormat;
//!
//! let format = detect_format("image.fits")?;
//! assert_eq!(format, FileFormat::Fits);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::io::formats::fits::constants::SIMPLE_MAGIC;
use crate::FitsError;

use super::metadata::FileFormat;

/// Try to detect the file format from the file content.
///
/// Reads the first card and checks for the FITS magic, falling back to the
/// file extension when the magic is absent.
///
/// # Errors
///
/// Returns `NotFound` if the file cannot be opened.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<FileFormat, FitsError> {
    let path_ref = path.as_ref();

    match detect_from_magic(path_ref)? {
        FileFormat::Unknown => Ok(detect_from_extension(path_ref)),
        format => Ok(format),
    }
}

/// Detect format by reading the first card.
fn detect_from_magic(path: &Path) -> Result<FileFormat, FitsError> {
    let not_found = || FitsError::not_found(path.to_string_lossy().to_string());
    if path.is_dir() {
        return Err(not_found());
    }
    let mut file = File::open(path).map_err(|_| not_found())?;

    let mut header = [0u8; 80];
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => {
                return Err(FitsError::decode(
                    "detection",
                    format!("Failed to read header: {e}"),
                ))
            }
        }
    }

    if is_fits_magic(&header[..filled]) {
        return Ok(FileFormat::Fits);
    }

    Ok(FileFormat::Unknown)
}

/// Check if the bytes start with the FITS primary header magic.
pub fn is_fits_magic(header: &[u8]) -> bool {
    header.starts_with(SIMPLE_MAGIC)
}

/// Detect format from file extension (fallback).
fn detect_from_extension(path: &Path) -> FileFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "fits" | "fit" | "fts" => FileFormat::Fits,
            _ => FileFormat::Unknown,
        })
        .unwrap_or(FileFormat::Unknown)
}

/// Check if a file is likely a FITS file.
pub fn is_fits_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format(path), Ok(FileFormat::Fits))
}
