//! Incremental cache records.
//!
//! Both cache files are JSON objects keyed by `/`-separated paths relative to
//! the directory the owning pipeline tracks. `mtimeMs` is milliseconds since
//! the Unix epoch with sub-millisecond precision, compared for exact equality.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Modification time of one tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Modification time in epoch milliseconds.
    pub mtime_ms: f64,
}

/// Relative path to [`CacheRecord`].
pub type CacheManifest = BTreeMap<String, CacheRecord>;

/// Cached export analysis of one barrel source file.
///
/// Records written by older tool versions may lack the export lists; such
/// records are treated as stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrelCacheRecord {
    /// Modification time in epoch milliseconds.
    pub mtime_ms: f64,
    /// Default-export alias, present when the file has a default export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sorted value export names.
    #[serde(default)]
    pub value_exports: Option<Vec<String>>,
    /// Sorted type export names.
    #[serde(default)]
    pub type_exports: Option<Vec<String>>,
}

impl BarrelCacheRecord {
    /// Returns `true` if the record can be reused for a file with `mtime_ms`.
    #[must_use]
    pub fn is_fresh(&self, mtime_ms: f64) -> bool {
        self.mtime_ms == mtime_ms && self.value_exports.is_some() && self.type_exports.is_some()
    }
}

/// Relative path to [`BarrelCacheRecord`].
pub type BarrelManifest = BTreeMap<String, BarrelCacheRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_record_wire_form() {
        let mut manifest = CacheManifest::new();
        manifest.insert("src/app/page.tsx".to_owned(), CacheRecord { mtime_ms: 1.5 });
        let json = serde_json::to_string(&manifest).expect("serialize");
        assert_eq!(json, r#"{"src/app/page.tsx":{"mtimeMs":1.5}}"#);
    }

    #[test]
    fn test_barrel_record_without_exports_is_stale() {
        let record: BarrelCacheRecord =
            serde_json::from_str(r#"{"mtimeMs": 10.0}"#).expect("deserialize");
        assert!(!record.is_fresh(10.0));
    }

    #[test]
    fn test_barrel_record_fresh_on_equal_mtime() {
        let record = BarrelCacheRecord {
            mtime_ms: 10.0,
            name: Some("Button".to_owned()),
            value_exports: Some(vec![]),
            type_exports: Some(vec![]),
        };
        assert!(record.is_fresh(10.0));
        assert!(!record.is_fresh(11.0));
    }
}
