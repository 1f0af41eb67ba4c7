//! Scan statistics with atomic counters.
//!
//! This module provides [`ScanStats`] for tracking scan progress and
//! [`StatsSnapshot`] for point-in-time statistics views.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. Statistics are informational and don't require strict ordering.
//!
//! # Examples
//!
//! ```
//! use gc_scanner::ScanStats;
//!
//! let stats = ScanStats::new();
//!
//! // Increment counters during scanning
//! stats.increment_files();
//! stats.add_imports(3);
//!
//! // Get a snapshot for logging
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.files, 1);
//! assert_eq!(snapshot.imports, 3);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for scan statistics.
///
/// One instance is owned by the build context and shared with the
/// analyzer, the usage correlator and the barrel generator.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Files read and analyzed.
    files: AtomicU64,
    /// Value imports found.
    imports: AtomicU64,
    /// Export names found (value and type).
    exports: AtomicU64,
    /// Files whose barrel analysis was reused from the cache.
    cached: AtomicU64,
    /// Import specifiers resolved to a project file.
    resolved: AtomicU64,
    /// Import specifiers that resolved outside the project or not at all.
    discarded: AtomicU64,
}

impl ScanStats {
    /// Creates a new [`ScanStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the analyzed file count.
    #[inline]
    pub fn increment_files(&self) {
        self.files.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds to the import count.
    #[inline]
    pub fn add_imports(&self, count: u64) {
        self.imports.fetch_add(count, Ordering::Relaxed);
    }

    /// Adds to the export count.
    #[inline]
    pub fn add_exports(&self, count: u64) {
        self.exports.fetch_add(count, Ordering::Relaxed);
    }

    /// Increments the cache reuse count.
    #[inline]
    pub fn increment_cached(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the resolved import count.
    #[inline]
    pub fn increment_resolved(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the discarded import count.
    #[inline]
    pub fn increment_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of the current statistics.
    ///
    /// Each counter is loaded independently, so a snapshot taken during a
    /// scan may be slightly inconsistent.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files: self.files.load(Ordering::Relaxed),
            imports: self.imports.load(Ordering::Relaxed),
            exports: self.exports.load(Ordering::Relaxed),
            cached: self.cached.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.files.store(0, Ordering::Relaxed);
        self.imports.store(0, Ordering::Relaxed);
        self.exports.store(0, Ordering::Relaxed);
        self.cached.store(0, Ordering::Relaxed);
        self.resolved.store(0, Ordering::Relaxed);
        self.discarded.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of scan statistics.
///
/// # Examples
///
/// ```
/// use gc_scanner::StatsSnapshot;
///
/// let snap = StatsSnapshot {
///     resolved: 30,
///     discarded: 10,
///     ..Default::default()
/// };
/// assert!((snap.resolution_percent() - 75.0).abs() < 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files read and analyzed.
    pub files: u64,
    /// Value imports found.
    pub imports: u64,
    /// Export names found.
    pub exports: u64,
    /// Files reused from the barrel cache.
    pub cached: u64,
    /// Imports resolved to a project file.
    pub resolved: u64,
    /// Imports discarded as external or unresolvable.
    pub discarded: u64,
}

impl StatsSnapshot {
    /// Share of resolution attempts that landed on a project file.
    ///
    /// Returns 100.0 if nothing was resolved.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for statistics display
    pub fn resolution_percent(&self) -> f64 {
        let attempts = self.resolved + self.discarded;
        if attempts == 0 {
            return 100.0;
        }
        (self.resolved as f64 / attempts as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_stats_new() {
        let snap = ScanStats::new().snapshot();
        assert_eq!(snap, StatsSnapshot::default());
    }

    #[test]
    fn test_scan_stats_increment() {
        let stats = ScanStats::new();

        stats.increment_files();
        stats.increment_files();
        stats.add_imports(4);
        stats.add_exports(2);
        stats.increment_cached();
        stats.increment_resolved();
        stats.increment_discarded();

        let snap = stats.snapshot();
        assert_eq!(snap.files, 2);
        assert_eq!(snap.imports, 4);
        assert_eq!(snap.exports, 2);
        assert_eq!(snap.cached, 1);
        assert_eq!(snap.resolved, 1);
        assert_eq!(snap.discarded, 1);
    }

    #[test]
    fn test_scan_stats_reset() {
        let stats = ScanStats::new();
        stats.increment_files();
        stats.add_imports(1);

        stats.reset();

        let snap = stats.snapshot();
        assert_eq!(snap.files, 0);
        assert_eq!(snap.imports, 0);
    }

    #[test]
    fn test_resolution_percent() {
        assert!((StatsSnapshot::default().resolution_percent() - 100.0).abs() < f64::EPSILON);

        let snap = StatsSnapshot {
            resolved: 1,
            discarded: 1,
            ..Default::default()
        };
        assert!((snap.resolution_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_snapshot_serialization() {
        let snap = StatsSnapshot {
            files: 12,
            imports: 40,
            exports: 9,
            cached: 3,
            resolved: 30,
            discarded: 10,
        };

        let json = serde_json::to_string(&snap).expect("Serialization failed");
        let parsed: StatsSnapshot = serde_json::from_str(&json).expect("Deserialization failed");
        assert_eq!(snap, parsed);
    }
}
