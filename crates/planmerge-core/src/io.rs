use crate::error::{InputKind, MergeError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// The destination is either left untouched or fully replaced.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a whole file as UTF-8.
///
/// A missing file maps to `InputNotFound` with the given `kind`; invalid
/// bytes map to `Decode`. No other encodings are attempted.
pub fn read_utf8(path: &Path, kind: InputKind) -> Result<String> {
    if !path.is_file() {
        return Err(MergeError::InputNotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| MergeError::Decode {
        path: path.to_path_buf(),
    })
}
