//! Reading uploads from disk.
//!
//! Large files are memory-mapped to avoid copying them from kernel to
//! user space; small files use a plain read, which has lower overhead.

use crate::error::InputError;
use memmap2::Mmap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Read an upload, memory-mapping it when it is large.
pub fn read_file_bytes(path: &Path) -> Result<FileBytes, InputError> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;

    if metadata.len() >= MMAP_THRESHOLD {
        let file = File::open(path).map_err(|e| io_error(path, e))?;

        // SAFETY: the mapping is read-only and the file handle lives as
        // long as the map.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| io_error(path, e))?;
        Ok(FileBytes::Mmap(mmap))
    } else {
        let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
        Ok(FileBytes::Vec(bytes))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> InputError {
    if source.kind() == ErrorKind::NotFound {
        InputError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        InputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File bytes that may be either owned or memory-mapped.
pub enum FileBytes {
    /// Standard heap-allocated bytes
    Vec(Vec<u8>),
    /// Memory-mapped bytes (zero-copy from disk)
    Mmap(Mmap),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

impl std::ops::Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

/// Quick magic-byte check used to reject non-images before hashing
/// and decoding. HEIC is deliberately absent: it cannot be decoded here.
pub fn validate_image_header(bytes: &[u8]) -> bool {
    if bytes.len() < 8 {
        return false;
    }

    !matches!(
        super::ImageFormat::sniff(bytes),
        super::ImageFormat::Other
    )
}
