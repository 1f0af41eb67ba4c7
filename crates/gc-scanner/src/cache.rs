//! Incremental mtime caches.
//!
//! This module provides two persisted caches keyed by `/`-separated paths
//! relative to a base directory:
//!
//! - [`CacheStore`] records the modification time of every tracked file and
//!   answers whether anything changed since the last successful run.
//! - [`BarrelCache`] additionally records each file's exports so unchanged
//!   files need not be re-parsed when a barrel is regenerated.
//!
//! A missing or corrupt cache file reads as empty, which makes the next run
//! treat everything as changed.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use gc_scanner::CacheStore;
//!
//! let store = CacheStore::new(
//!     Utf8Path::new("/repo/scripts/.cache/build-gallery-usage.json"),
//!     Utf8Path::new("/repo"),
//! );
//! let tracked = vec![Utf8Path::new("/repo/src/app/page.tsx").to_owned()];
//! if store.has_changes(&store.load(), &tracked)? {
//!     // ... regenerate ...
//!     store.write(&tracked)?;
//! }
//! # Ok::<(), gc_scanner::ScanError>(())
//! ```

use std::io;
use std::time::UNIX_EPOCH;

use camino::{Utf8Path, Utf8PathBuf};
use gc_core::{BarrelCacheRecord, BarrelManifest, CacheManifest, CacheRecord};
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ScanError;
use crate::output::write_atomic;
use crate::walker::to_slash;

/// Returns a file's modification time in epoch milliseconds.
///
/// # Errors
///
/// Returns [`ScanError::Read`] if the file's metadata cannot be read.
pub fn mtime_ms(path: &Utf8Path) -> Result<f64, ScanError> {
    let modified = std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| ScanError::read(path, e))?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ScanError::read(path, io::Error::other(e)))?;
    Ok(since_epoch.as_secs_f64() * 1000.0)
}

/// The mtime cache of one pipeline.
#[derive(Debug, Clone)]
pub struct CacheStore {
    file: Utf8PathBuf,
    base: Utf8PathBuf,
}

impl CacheStore {
    /// Creates a store persisted at `file`, keying entries relative to `base`.
    #[must_use]
    pub fn new(file: &Utf8Path, base: &Utf8Path) -> Self {
        Self {
            file: file.to_owned(),
            base: base.to_owned(),
        }
    }

    /// Path of the cache file.
    #[inline]
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// The cache key of `path`.
    #[must_use]
    pub fn key(&self, path: &Utf8Path) -> String {
        relative_key(&self.base, path)
    }

    /// Loads the stored manifest; missing or corrupt files read as empty.
    #[must_use]
    pub fn load(&self) -> CacheManifest {
        load_json(&self.file)
    }

    /// Returns `true` unless every tracked file exists with exactly the
    /// stored mtime and the manifest holds no other entries.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] if a file exists but its metadata cannot
    /// be read.
    pub fn has_changes(
        &self,
        manifest: &CacheManifest,
        files: &[Utf8PathBuf],
    ) -> Result<bool, ScanError> {
        let mut seen = FxHashSet::default();

        for path in files {
            if !path.exists() {
                debug!(%path, "tracked file missing");
                return Ok(true);
            }
            let key = self.key(path);
            let Some(record) = manifest.get(&key) else {
                debug!(%path, "tracked file not in cache");
                return Ok(true);
            };
            if record.mtime_ms != mtime_ms(path)? {
                debug!(%path, "tracked file modified");
                return Ok(true);
            }
            seen.insert(key);
        }

        let leftovers = manifest.keys().filter(|key| !seen.contains(*key)).count();
        if leftovers > 0 {
            debug!(leftovers, "cache references files no longer tracked");
            return Ok(true);
        }
        Ok(false)
    }

    /// Records the current mtime of every file and writes the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] if a file cannot be stat'ed, or
    /// [`ScanError::Write`] if the cache cannot be written.
    pub fn write(&self, files: &[Utf8PathBuf]) -> Result<CacheManifest, ScanError> {
        let mut manifest = CacheManifest::new();
        for path in files {
            manifest.insert(
                self.key(path),
                CacheRecord {
                    mtime_ms: mtime_ms(path)?,
                },
            );
        }
        write_json(&self.file, &manifest)?;
        Ok(manifest)
    }
}

/// The per-file export cache of one barrel target.
#[derive(Debug, Clone)]
pub struct BarrelCache {
    file: Utf8PathBuf,
    base: Utf8PathBuf,
    records: BarrelManifest,
}

impl BarrelCache {
    /// Loads the cache at `file`; missing or corrupt files read as empty.
    #[must_use]
    pub fn load(file: &Utf8Path, base: &Utf8Path) -> Self {
        Self {
            file: file.to_owned(),
            base: base.to_owned(),
            records: load_json(file),
        }
    }

    /// An empty cache that will be written to `file`.
    #[must_use]
    pub fn empty(file: &Utf8Path, base: &Utf8Path) -> Self {
        Self {
            file: file.to_owned(),
            base: base.to_owned(),
            records: BarrelManifest::new(),
        }
    }

    /// The cache key of `path`.
    #[must_use]
    pub fn key(&self, path: &Utf8Path) -> String {
        relative_key(&self.base, path)
    }

    /// The stored record for `path` if it is complete and its mtime matches.
    #[must_use]
    pub fn fresh(&self, path: &Utf8Path, mtime_ms: f64) -> Option<&BarrelCacheRecord> {
        self.records
            .get(&self.key(path))
            .filter(|record| record.is_fresh(mtime_ms))
    }

    /// Returns `true` unless every file has a fresh record and no other
    /// records remain.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] if a file exists but cannot be stat'ed.
    pub fn has_changes(&self, files: &[Utf8PathBuf]) -> Result<bool, ScanError> {
        for path in files {
            if !path.exists() || self.fresh(path, mtime_ms(path)?).is_none() {
                debug!(%path, "barrel source changed");
                return Ok(true);
            }
        }
        let tracked: FxHashSet<String> = files.iter().map(|path| self.key(path)).collect();
        Ok(self.records.keys().any(|key| !tracked.contains(key)))
    }

    /// All stored records.
    #[must_use]
    pub fn records(&self) -> &BarrelManifest {
        &self.records
    }

    /// Replaces the stored records with `records` and writes the file.
    ///
    /// Records of files not in `records` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Write`] if the cache cannot be written.
    pub fn replace(&mut self, records: BarrelManifest) -> Result<(), ScanError> {
        self.records = records;
        write_json(&self.file, &self.records)
    }
}

fn relative_key(base: &Utf8Path, path: &Utf8Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) => to_slash(relative),
        Err(_) => to_slash(path),
    }
}

fn load_json<T: DeserializeOwned + Default>(file: &Utf8Path) -> T {
    let contents = match std::fs::read_to_string(file) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(%file, error = %e, "no cache file");
            return T::default();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        debug!(%file, error = %e, "ignoring corrupt cache file");
        T::default()
    })
}

fn write_json<T: Serialize>(file: &Utf8Path, value: &T) -> Result<(), ScanError> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|e| ScanError::write(file, io::Error::other(e)))?;
    json.push('\n');
    write_atomic(file, &json)
}
