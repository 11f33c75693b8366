//! Output directory setup and atomic persist of encoded images.
//!
//! Each image is written to a temp file in the output directory and renamed
//! over the final name, so a crash never leaves a truncated image and a
//! re-run over the same index overwrites instead of duplicating.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Create the output directory (and parents) if absent.
pub fn ensure_output_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Writes `bytes` to `dir/file_name` atomically. Replaces an existing file.
pub fn persist(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let final_path = dir.join(file_name);
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&final_path).map_err(|e| e.error)?;
    Ok(final_path)
}
