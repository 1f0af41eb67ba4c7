//! Parallel file analysis using rayon.
//!
//! This module provides [`FileAnalyzer`], which reads and parses TypeScript
//! files in parallel and returns their imports and exports.
//!
//! # Design
//!
//! Uses the "collect-then-parallelize" pattern:
//!
//! 1. Paths are collected first by [`SourceWalker`](crate::SourceWalker)
//! 2. `FileAnalyzer` processes paths in parallel with `rayon::par_iter()`
//! 3. Per-thread parsers are created via `map_init()`
//! 4. Results are collected in input order
//!
//! The analyzer owns a dedicated thread pool sized by `maxParallelJobs`, so
//! the number of files open at once never exceeds that limit.

use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use gc_ts_parser::{FileAnalysis, ParseError, Parsers};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::error::ScanError;
use crate::stats::ScanStats;

/// The imports and exports of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedFile {
    /// Absolute path of the file.
    pub path: Utf8PathBuf,
    /// Extracted imports and exports.
    pub analysis: FileAnalysis,
}

/// Parallel file analyzer.
///
/// # Thread Safety
///
/// `FileAnalyzer` is both `Send` and `Sync`. Parsers are created per worker
/// thread during analysis, so no shared mutable state exists apart from the
/// atomic [`ScanStats`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use camino::Utf8PathBuf;
/// use gc_scanner::{FileAnalyzer, ScanStats};
///
/// let analyzer = FileAnalyzer::new(Some(4), Arc::new(ScanStats::new()))?;
/// let files = analyzer.analyze_files(&[Utf8PathBuf::from("src/app/page.tsx")])?;
/// for file in &files {
///     println!("{}: {} imports", file.path, file.analysis.imports.len());
/// }
/// # Ok::<(), gc_scanner::ScanError>(())
/// ```
pub struct FileAnalyzer {
    pool: ThreadPool,
    stats: Arc<ScanStats>,
}

impl FileAnalyzer {
    /// Creates an analyzer running at most `max_jobs` files at once.
    ///
    /// `None` uses one thread per available CPU.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] for a zero job count,
    /// [`ScanError::ThreadPool`] if the pool cannot start, and
    /// [`ScanError::Parser`] if the grammars fail to load.
    pub fn new(max_jobs: Option<usize>, stats: Arc<ScanStats>) -> Result<Self, ScanError> {
        if max_jobs == Some(0) {
            return Err(ScanError::config("maxParallelJobs must be at least 1"));
        }

        // Fail fast on grammar problems instead of once per file
        Parsers::new()?;

        let threads = max_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        });
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("gc-analyze-{index}"))
            .build()?;

        debug!(threads, "created analysis pool");
        Ok(Self { pool, stats })
    }

    /// Returns the shared statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &Arc<ScanStats> {
        &self.stats
    }

    /// Number of worker threads.
    #[inline]
    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Analyzes multiple files in parallel.
    ///
    /// Results are returned in the order of `paths`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScanError::Read`] encountered. A build never
    /// proceeds with a file missing from its analysis.
    pub fn analyze_files(&self, paths: &[Utf8PathBuf]) -> Result<Vec<AnalyzedFile>, ScanError> {
        let results = self.pool.install(|| {
            paths
                .par_iter()
                .map_init(
                    // Per-thread initialization: one parser per grammar
                    || Parsers::new().ok(),
                    |parsers, path| {
                        let parsers = parsers
                            .as_mut()
                            .ok_or(ScanError::Parser(ParseError::LanguageInit))?;
                        self.analyze_file_inner(parsers, path)
                    },
                )
                .collect::<Result<Vec<_>, ScanError>>()
        })?;

        info!(files = results.len(), "analyzed files");
        Ok(results)
    }

    /// Analyzes a single file on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] if the file cannot be read.
    pub fn analyze_single(&self, path: &Utf8Path) -> Result<AnalyzedFile, ScanError> {
        let mut parsers = Parsers::new()?;
        self.analyze_file_inner(&mut parsers, path)
    }

    /// Analyzes in-memory source as if it were `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Parser`] if the parser fails.
    pub fn analyze_source(&self, path: &Utf8Path, source: &str) -> Result<AnalyzedFile, ScanError> {
        let mut parsers = Parsers::new()?;
        Ok(self.finish(path, parsers.analyze(source, path)?))
    }

    fn analyze_file_inner(
        &self,
        parsers: &mut Parsers,
        path: &Utf8Path,
    ) -> Result<AnalyzedFile, ScanError> {
        let source =
            fs::read_to_string(path.as_std_path()).map_err(|e| ScanError::read(path, e))?;
        let analysis = parsers.analyze(&source, path)?;
        Ok(self.finish(path, analysis))
    }

    fn finish(&self, path: &Utf8Path, analysis: FileAnalysis) -> AnalyzedFile {
        self.stats.increment_files();
        self.stats.add_imports(analysis.imports.len() as u64);
        self.stats.add_exports(analysis.exports.named_count() as u64);

        debug!(
            %path,
            imports = analysis.imports.len(),
            exports = analysis.exports.named_count(),
            has_default = analysis.exports.has_default,
            "analyzed file"
        );

        AnalyzedFile {
            path: path.to_owned(),
            analysis,
        }
    }
}

impl std::fmt::Debug for FileAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAnalyzer")
            .field("threads", &self.pool.current_num_threads())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
