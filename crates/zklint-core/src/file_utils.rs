//! Safe file reading utilities
//!
//! Hardened file reading with symlink rejection, regular file checks, and a
//! size limit. There is an inherent TOCTOU window between the metadata check
//! and the read; acceptable for a validator running on trusted local input.

use crate::diagnostics::{ValidateError, ValidateResult};
use std::fs;
use std::path::Path;

/// Default maximum file size (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Safely read a file with security checks.
///
/// Rejects symlinks (via `symlink_metadata`, without following), rejects
/// non-regular files (directories, FIFOs, sockets, devices), and enforces a
/// maximum file size. Files at exactly the limit are accepted.
pub fn safe_read_file(path: &Path) -> ValidateResult<String> {
    safe_read_file_with_limit(path, DEFAULT_MAX_FILE_SIZE)
}

/// Safely read a file with a custom size limit.
pub fn safe_read_file_with_limit(path: &Path, max_size: u64) -> ValidateResult<String> {
    let metadata = fs::symlink_metadata(path).map_err(|e| ValidateError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.file_type().is_symlink() {
        return Err(ValidateError::FileSymlink {
            path: path.to_path_buf(),
        });
    }

    if !metadata.is_file() {
        return Err(ValidateError::FileNotRegular {
            path: path.to_path_buf(),
        });
    }

    let size = metadata.len();
    if size > max_size {
        return Err(ValidateError::FileTooBig {
            path: path.to_path_buf(),
            size,
            limit: max_size,
        });
    }

    fs::read_to_string(path).map_err(|e| ValidateError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}
