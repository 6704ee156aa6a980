// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Memory-mapped file arena for safe lifetime management.
//!
//! The `MmapArena` owns the memory-mapped container and hands out slices
//! tied to its lifetime. Readers borrow from the arena and table views
//! borrow from readers, so the mapping is released exactly once, when the
//! arena drops, on every exit path.
//!
//! # Ownership Model
//!
//! ```text
//! MmapArena (owns mmap)
//!   ↓
//! FitsReader (owns arena, indexes HDUs)
//!   ↓
//! FitsTable (borrows one HDU's data segment)
//! ```

use std::fs::File;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::Path;

use crate::FitsError;

/// A memory-mapped file arena that owns all file data.
///
/// Pages are only faulted in when a slice is actually read, so walking the
/// headers of a large file touches the header blocks and nothing else.
pub struct MmapArena {
    /// The memory-mapped file (owned)
    mmap: memmap2::Mmap,
    /// File path for diagnostics
    path: String,
}

impl MmapArena {
    /// Open a file and create a memory-mapped arena.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file does not exist or cannot be opened,
    /// and `Decode` if it is empty or cannot be mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FitsError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref).map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                FitsError::not_found(path_str.clone())
            }
            _ => FitsError::decode("open", format!("Failed to open file '{path_str}': {e}")),
        })?;

        let metadata = file.metadata().map_err(|e| {
            FitsError::decode("open", format!("Failed to stat file '{path_str}': {e}"))
        })?;
        if metadata.is_dir() {
            return Err(FitsError::not_found(path_str));
        }
        if metadata.len() == 0 {
            return Err(FitsError::decode("open", format!("File '{path_str}' is empty")));
        }

        // The arena owns the mapping and only lends out slices bound to its
        // own lifetime. The file must not be truncated while mapped.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| {
            FitsError::decode("open", format!("Failed to mmap file '{path_str}': {e}"))
        })?;

        Ok(Self {
            mmap,
            path: path_str,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a reference to the memory-mapped data.
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    /// Get the length of the data.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Borrow `len` bytes starting at `offset`, with bounds checking.
    ///
    /// # Errors
    ///
    /// Returns a `Decode` error if the range runs past the end of the file.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], FitsError> {
        let end = offset.checked_add(len).ok_or_else(|| {
            FitsError::decode("slice", format!("range {offset}+{len} overflows"))
        })?;

        if end > self.mmap.len() {
            return Err(FitsError::decode(
                "slice",
                format!(
                    "requested {len} bytes at offset {offset}, but the file is only {} bytes",
                    self.mmap.len()
                ),
            ));
        }

        Ok(&self.mmap[offset..end])
    }
}

impl Deref for MmapArena {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.mmap
    }
}

impl std::fmt::Debug for MmapArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapArena")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_temp_file(name: &str, data: &[u8]) -> String {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "fitstream_test_arena_{}_{}.tmp",
            std::process::id(),
            name
        ));
        {
            let mut temp_file = File::create(&path).unwrap();
            temp_file.write_all(data).unwrap();
            temp_file.flush().unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_arena_open() {
        let path = create_temp_file("open", b"hello world");

        let arena = MmapArena::open(&path).unwrap();
        assert_eq!(arena.data(), b"hello world");
        assert_eq!(arena.len(), 11);
        assert!(!arena.is_empty());
        assert_eq!(arena.path(), path);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_arena_slice() {
        let path = create_temp_file("slice", b"hello world");

        let arena = MmapArena::open(&path).unwrap();
        assert_eq!(arena.slice(0, 5).unwrap(), b"hello");
        assert_eq!(arena.slice(6, 5).unwrap(), b"world");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_arena_slice_out_of_bounds() {
        let path = create_temp_file("oob", b"hello");

        let arena = MmapArena::open(&path).unwrap();
        assert!(matches!(
            arena.slice(0, 100),
            Err(FitsError::Decode { .. })
        ));
        assert!(arena.slice(10, 1).is_err());
        assert!(arena.slice(usize::MAX, 2).is_err());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_arena_missing_file() {
        let err = MmapArena::open("/nonexistent/fitstream/file.fits").unwrap_err();
        assert!(matches!(err, FitsError::NotFound { .. }));
    }

    #[test]
    fn test_arena_empty_file() {
        let path = create_temp_file("empty", b"");

        let err = MmapArena::open(&path).unwrap_err();
        assert!(matches!(err, FitsError::Decode { .. }));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_arena_deref() {
        let path = create_temp_file("deref", b"hello");

        let arena = MmapArena::open(&path).unwrap();
        assert_eq!(arena.first().copied(), Some(b'h'));

        let _ = std::fs::remove_file(&path);
    }
}
