use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Every regular file in the receipts directory, sorted by path so the
/// rendered document lists attachments in the same order on every platform.
/// The directory itself is a precondition of the run: if it does not exist
/// the load fails instead of silently attaching nothing.
pub fn list_receipts(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::ReceiptsDirMissing(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
