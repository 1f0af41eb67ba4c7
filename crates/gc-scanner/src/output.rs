//! Atomic file output.
//!
//! Every artifact and cache file is written through [`write_atomic`]: the
//! contents go to a temporary file in the destination directory, which is
//! then renamed over the target. Readers never observe a partial file.

use std::io::Write as _;

use camino::Utf8Path;
use tempfile::NamedTempFile;

use crate::error::ScanError;

/// Writes `contents` to `path` atomically, creating parent directories.
///
/// # Errors
///
/// Returns [`ScanError::Write`] naming `path` if any step fails.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use gc_scanner::write_atomic;
///
/// let dir = tempfile::tempdir()?;
/// let path = Utf8PathBuf::try_from(dir.path().join("out/usage.json"))?;
/// write_atomic(&path, "{}\n")?;
/// assert_eq!(std::fs::read_to_string(&path)?, "{}\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_atomic(path: &Utf8Path, contents: &str) -> Result<(), ScanError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| ScanError::write(path, e))?;

    let mut file = NamedTempFile::new_in(parent).map_err(|e| ScanError::write(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| ScanError::write(path, e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| ScanError::write(path, e))?;
    file.persist(path)
        .map_err(|e| ScanError::write(path, e.error))?;

    tracing::debug!(%path, bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("index.ts")).expect("utf-8");

        write_atomic(&path, "old").expect("first write");
        write_atomic(&path, "new").expect("second write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "new");
        let leftovers = std::fs::read_dir(dir.path()).expect("read_dir").count();
        assert_eq!(leftovers, 1, "temporary file should be renamed away");
    }

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path =
            Utf8PathBuf::from_path_buf(dir.path().join("a/b/c.json")).expect("utf-8");
        write_atomic(&path, "{}").expect("write");
        assert!(path.is_file());
    }
}
