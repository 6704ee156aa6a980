// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! FITS container reader.
//!
//! Opening a file maps it once and walks the HDU chain, parsing every
//! header but never touching data segments. The resulting index answers
//! `info` in O(number of HDUs), and [`FitsReader::table`] binds a table
//! HDU's layout to its slice of the mapping for windowed row reads.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::{FitsError, Result};
use crate::io::arena::MmapArena;
use crate::io::metadata::{UnitInfo, UnitKind};

use super::constants::{
    padded_len, BLOCK_SIZE, PRIMARY_NAME, SIMPLE_MAGIC, XTENSION_MAGIC, XT_BINTABLE, XT_IMAGE,
    XT_TABLE,
};
use super::header::Header;
use super::table::{FitsTable, TableLayout};

/// One header/data unit.
#[derive(Debug, Clone)]
pub struct Hdu {
    /// 0-based position in the file
    pub index: usize,
    /// Resolved name
    pub name: String,
    /// Classification, computed once
    pub kind: UnitKind,
    /// Parsed header
    pub header: Header,
    /// Byte offset of the data segment
    pub data_offset: usize,
    /// Data segment size, without padding
    pub data_len: usize,
}

impl Hdu {
    /// Manifest entry for this HDU.
    ///
    /// Table HDUs also report their row and declared field counts, read
    /// from the header.
    pub fn info(&self) -> UnitInfo {
        let info = UnitInfo::new(self.index, self.name.clone(), self.kind);
        if !self.kind.is_table() {
            return info;
        }

        match (
            self.header.get_int("NAXIS2"),
            self.header.get_int("TFIELDS"),
        ) {
            (Some(rows), Some(fields)) if rows >= 0 && fields >= 0 => {
                info.with_table_shape(rows as u64, fields as usize)
            }
            _ => info,
        }
    }
}

/// Read-only FITS file, indexed by HDU.
///
/// # Example
///
/// ```no_run
/// use fitstream::io::formats::fits::FitsReader;
///
/// let reader = FitsReader::open("catalog.fits")?;
/// for unit in reader.units() {
///     println!("{} {} {}", unit.index, unit.name, unit.kind);
/// }
/// # Ok::<(), fitstream::FitsError>(())
/// ```
pub struct FitsReader {
    arena: MmapArena,
    hdus: Vec<Hdu>,
}

impl FitsReader {
    /// Open a FITS file and index its HDUs.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the path cannot be opened and `Decode` if the
    /// bytes are not a valid FITS file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let arena = MmapArena::open(path)?;
        let hdus = walk(&arena)?;

        debug!(
            context = "fits_open",
            path = %arena.path(),
            hdus = hdus.len(),
            "Indexed FITS file"
        );

        Ok(Self { arena, hdus })
    }

    /// Path the reader was opened from.
    pub fn path(&self) -> &str {
        self.arena.path()
    }

    /// Number of HDUs.
    pub fn unit_count(&self) -> usize {
        self.hdus.len()
    }

    /// Manifest of every HDU.
    pub fn units(&self) -> Vec<UnitInfo> {
        self.hdus.iter().map(Hdu::info).collect()
    }

    /// Open the table HDU at `index` for row access.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` for a missing HDU, `NotATable` for a
    /// non-tabular one, and `Decode` for a malformed table header.
    pub fn table(&self, index: usize) -> Result<FitsTable<'_>> {
        let hdu = self
            .hdus
            .get(index)
            .ok_or_else(|| FitsError::index_out_of_bounds(index as i64, self.hdus.len()))?;

        let layout = match hdu.kind {
            UnitKind::BinaryTable => TableLayout::binary(&hdu.header)?,
            UnitKind::AsciiTable => TableLayout::ascii(&hdu.header)?,
            kind => {
                return Err(FitsError::not_a_table(
                    index,
                    hdu.name.clone(),
                    kind.as_str(),
                ))
            }
        };

        let data = self.arena.slice(hdu.data_offset, hdu.data_len)?;
        FitsTable::new(layout, data)
    }
}

impl std::fmt::Debug for FitsReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitsReader")
            .field("path", &self.arena.path())
            .field("hdus", &self.hdus.len())
            .finish()
    }
}

/// Walk the HDU chain from the start of the file.
fn walk(data: &[u8]) -> Result<Vec<Hdu>> {
    if !data.starts_with(SIMPLE_MAGIC) {
        return Err(FitsError::decode(
            "header",
            "not a FITS file: missing SIMPLE card",
        ));
    }

    let mut hdus = Vec::new();
    let mut offset = 0usize;

    loop {
        let index = hdus.len();
        let (header, header_len) = Header::parse(&data[offset..]).map_err(|e| match e {
            FitsError::Decode { context, message } => {
                FitsError::decode(context, format!("HDU {index}: {message}"))
            }
            other => other,
        })?;

        if index == 0 && header.get_bool("SIMPLE") != Some(true) {
            return Err(FitsError::decode(
                "header",
                "SIMPLE is not T; file does not conform to FITS",
            ));
        }

        let kind = classify(&header, index)?;
        let data_len = data_size(&header, kind, index)?;
        let data_offset = offset + header_len;

        let end = data_offset.checked_add(data_len).unwrap_or(usize::MAX);
        if end > data.len() {
            return Err(FitsError::decode(
                "data",
                format!(
                    "HDU {index}: data segment of {data_len} bytes at offset {data_offset} extends past end of file ({} bytes)",
                    data.len()
                ),
            ));
        }

        let name = header
            .get_str("EXTNAME")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if index == 0 {
                    PRIMARY_NAME.to_string()
                } else {
                    UnitInfo::default_name(index)
                }
            });

        debug!(
            context = "fits_walk",
            index,
            name = %name,
            kind = %kind,
            data_len,
            "Found HDU"
        );

        hdus.push(Hdu {
            index,
            name,
            kind,
            header,
            data_offset,
            data_len,
        });

        offset = data_offset.saturating_add(padded_len(data_len));
        if offset >= data.len() {
            break;
        }

        let remaining = &data[offset..];
        if remaining.len() < BLOCK_SIZE || !remaining.starts_with(XTENSION_MAGIC) {
            if remaining.iter().any(|&b| b != 0 && b != b' ') {
                warn!(
                    context = "fits_walk",
                    offset,
                    trailing_bytes = remaining.len(),
                    "Ignoring trailing bytes after last HDU"
                );
            }
            break;
        }
    }

    Ok(hdus)
}

/// Classify an HDU from its header.
fn classify(header: &Header, index: usize) -> Result<UnitKind> {
    if index == 0 {
        let random_groups =
            header.get_bool("GROUPS") == Some(true) && header.get_int("NAXIS1") == Some(0);
        return Ok(if random_groups {
            UnitKind::RandomGroups
        } else {
            UnitKind::Primary
        });
    }

    let xtension = header.get_str("XTENSION").ok_or_else(|| {
        FitsError::decode("header", format!("HDU {index}: missing XTENSION value"))
    })?;

    Ok(match xtension.trim() {
        XT_IMAGE => UnitKind::Image,
        XT_TABLE => UnitKind::AsciiTable,
        XT_BINTABLE if header.get_bool("ZIMAGE") == Some(true) => UnitKind::CompressedImage,
        XT_BINTABLE => UnitKind::BinaryTable,
        _ => UnitKind::Foreign,
    })
}

/// Size in bytes of an HDU's data segment, without padding.
///
/// `|BITPIX|/8 * GCOUNT * (PCOUNT + NAXIS1 * ... * NAXISn)`; random groups
/// leave `NAXIS1` out of the product.
fn data_size(header: &Header, kind: UnitKind, index: usize) -> Result<usize> {
    let invalid = |message: String| FitsError::decode("header", format!("HDU {index}: {message}"));

    let bitpix = header.require_int("BITPIX")?;
    if !matches!(bitpix, 8 | 16 | 32 | 64 | -32 | -64) {
        return Err(invalid(format!("invalid BITPIX {bitpix}")));
    }

    let naxis = header.require_int("NAXIS")?;
    if !(0..=999).contains(&naxis) {
        return Err(invalid(format!("invalid NAXIS {naxis}")));
    }
    if naxis == 0 {
        return Ok(0);
    }

    let first_axis = if kind == UnitKind::RandomGroups { 2 } else { 1 };
    let mut elements: u64 = 1;
    for n in 1..=naxis {
        let len = header.require_int(&format!("NAXIS{n}"))?;
        if len < 0 {
            return Err(invalid(format!("negative NAXIS{n} {len}")));
        }
        if n >= first_axis {
            elements = elements
                .checked_mul(len as u64)
                .ok_or_else(|| invalid("data size overflows".to_string()))?;
        }
    }

    let pcount = header.get_int("PCOUNT").unwrap_or(0);
    let gcount = header.get_int("GCOUNT").unwrap_or(1);
    if pcount < 0 || gcount < 0 {
        return Err(invalid(format!("invalid PCOUNT {pcount} / GCOUNT {gcount}")));
    }

    let bytes = (bitpix.unsigned_abs() / 8)
        .checked_mul(gcount as u64)
        .and_then(|v| v.checked_mul((pcount as u64).checked_add(elements)?))
        .ok_or_else(|| invalid("data size overflows".to_string()))?;

    usize::try_from(bytes).map_err(|_| invalid(format!("data size {bytes} is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(cards: &[String]) -> Vec<u8> {
        let mut text: String = cards.iter().map(|c| format!("{c:<80}")).collect();
        text.push_str(&format!("{:<80}", "END"));
        let mut bytes = text.into_bytes();
        bytes.resize(padded_len(bytes.len()), b' ');
        bytes
    }

    fn kv(key: &str, value: &str) -> String {
        format!("{key:<8}= {value:>20}")
    }

    fn primary() -> Vec<u8> {
        block(&[
            kv("SIMPLE", "T"),
            kv("BITPIX", "8"),
            kv("NAXIS", "0"),
            kv("EXTEND", "T"),
        ])
    }

    fn image_ext(name: Option<&str>) -> Vec<u8> {
        let mut cards = vec![
            format!("{:<8}= 'IMAGE   '", "XTENSION"),
            kv("BITPIX", "16"),
            kv("NAXIS", "2"),
            kv("NAXIS1", "10"),
            kv("NAXIS2", "10"),
            kv("PCOUNT", "0"),
            kv("GCOUNT", "1"),
        ];
        if let Some(name) = name {
            cards.push(format!("{:<8}= '{name}'", "EXTNAME"));
        }
        let mut bytes = block(&cards);
        bytes.resize(bytes.len() + BLOCK_SIZE, 0);
        bytes
    }

    fn bintable_ext(extra: &[String]) -> Vec<u8> {
        let mut cards = vec![
            format!("{:<8}= 'BINTABLE'", "XTENSION"),
            kv("BITPIX", "8"),
            kv("NAXIS", "2"),
            kv("NAXIS1", "4"),
            kv("NAXIS2", "2"),
            kv("PCOUNT", "0"),
            kv("GCOUNT", "1"),
            kv("TFIELDS", "1"),
            format!("{:<8}= 'X'", "TTYPE1"),
            format!("{:<8}= 'J'", "TFORM1"),
        ];
        cards.extend_from_slice(extra);
        let mut bytes = block(&cards);
        let mut data = Vec::new();
        data.extend_from_slice(&7i32.to_be_bytes());
        data.extend_from_slice(&8i32.to_be_bytes());
        data.resize(BLOCK_SIZE, 0);
        bytes.extend_from_slice(&data);
        bytes
    }

    #[test]
    fn test_walk_classifies_units() {
        let mut file = primary();
        file.extend(image_ext(None));
        file.extend(bintable_ext(&[format!("{:<8}= 'EVENTS'", "EXTNAME")]));
        file.extend(bintable_ext(&[kv("ZIMAGE", "T")]));

        let hdus = walk(&file).unwrap();
        let kinds: Vec<UnitKind> = hdus.iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::Primary,
                UnitKind::Image,
                UnitKind::BinaryTable,
                UnitKind::CompressedImage,
            ]
        );
        let names: Vec<&str> = hdus.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["PRIMARY", "Unit 1", "EVENTS", "Unit 3"]);

        assert_eq!(hdus[1].data_len, 200);
        assert_eq!(hdus[2].data_len, 8);

        let info = hdus[2].info();
        assert!(info.is_table);
        assert_eq!(info.rows, Some(2));
        assert_eq!(info.columns, Some(1));
        assert!(!hdus[3].info().is_table);
    }

    #[test]
    fn test_walk_rejects_non_fits() {
        let err = walk(b"PK\x03\x04 definitely a zip").unwrap_err();
        assert!(err.to_string().contains("not a FITS file"));
    }

    #[test]
    fn test_walk_rejects_simple_false() {
        let file = block(&[kv("SIMPLE", "F"), kv("BITPIX", "8"), kv("NAXIS", "0")]);
        let err = walk(&file).unwrap_err();
        assert!(err.to_string().contains("SIMPLE is not T"));
    }

    #[test]
    fn test_walk_truncated_data() {
        let mut file = primary();
        let mut ext = image_ext(Some("SCI"));
        ext.truncate(BLOCK_SIZE + 100);
        file.extend(ext);

        let err = walk(&file).unwrap_err();
        assert!(matches!(err, FitsError::Decode { .. }));
        assert!(err.to_string().contains("extends past end of file"));
    }

    #[test]
    fn test_walk_ignores_trailing_padding() {
        let mut file = primary();
        file.extend(vec![0u8; 100]);

        let hdus = walk(&file).unwrap();
        assert_eq!(hdus.len(), 1);
    }

    #[test]
    fn test_random_groups_size() {
        let file = block(&[
            kv("SIMPLE", "T"),
            kv("BITPIX", "-32"),
            kv("NAXIS", "2"),
            kv("NAXIS1", "0"),
            kv("NAXIS2", "3"),
            kv("GROUPS", "T"),
            kv("PCOUNT", "2"),
            kv("GCOUNT", "4"),
        ]);
        let (header, _) = Header::parse(&file).unwrap();
        let kind = classify(&header, 0).unwrap();
        assert_eq!(kind, UnitKind::RandomGroups);
        assert_eq!(data_size(&header, kind, 0).unwrap(), 4 * 4 * (2 + 3));
    }

    #[test]
    fn test_invalid_bitpix() {
        let file = block(&[kv("SIMPLE", "T"), kv("BITPIX", "12"), kv("NAXIS", "0")]);
        let err = walk(&file).unwrap_err();
        assert!(err.to_string().contains("invalid BITPIX 12"));
    }
}
