//! Directory traversal filtered by glob patterns.
//!
//! This module provides [`SourceWalker`], which uses the `ignore` crate to
//! walk a directory tree while respecting `.gitignore` patterns, and keeps
//! the files whose root-relative path matches a set of globs.
//!
//! # Features
//!
//! - Respects `.gitignore` and `.ignore` patterns
//! - Brace expansion (`src/app/**/*.{ts,tsx}`)
//! - `!pattern` entries exclude matches
//! - Skips hidden files and build output directories
//! - Returns sorted, de-duplicated [`Utf8PathBuf`]s
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use gc_scanner::SourceWalker;
//!
//! let walker = SourceWalker::new(Utf8Path::new("/path/to/project"))?
//!     .with_patterns(&["src/app/**/*.{ts,tsx}", "!**/*.test.tsx"])?;
//!
//! for path in walker.collect_paths()? {
//!     println!("Found: {path}");
//! }
//! # Ok::<(), gc_scanner::ScanError>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::warn;

use crate::error::ScanError;

/// Directories never descended into, whatever the patterns say.
const SKIP_DIRECTORIES: &[&str] = &["node_modules", ".git", "dist", ".next"];

/// Pattern used when no patterns are configured.
const DEFAULT_PATTERN: &str = "**/*.{ts,tsx}";

/// A file walker that collects files matching glob patterns.
///
/// Patterns are matched against paths relative to the walk root, using `/`
/// separators. `*` does not cross directory boundaries; `**` does.
///
/// # Design
///
/// The walker uses a "collect-then-parallelize" pattern:
/// 1. Walker collects all paths first (single-threaded, I/O bound)
/// 2. Paths are then processed in parallel with rayon
#[derive(Debug)]
pub struct SourceWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Paths that are collected.
    include: GlobSet,
    /// Paths that are dropped even when included.
    exclude: GlobSet,
    /// Whether to follow symbolic links.
    follow_links: bool,
}

impl SourceWalker {
    /// Creates a walker over `root` collecting every `.ts`/`.tsx` file.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root path doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::config(format!(
                "root path does not exist: {root}"
            )));
        }
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        let (include, exclude) = compile_patterns(&[DEFAULT_PATTERN])?;
        Ok(Self {
            root: root.to_owned(),
            include,
            exclude,
            follow_links: false,
        })
    }

    /// Replaces the patterns files must match.
    ///
    /// Entries starting with `!` are exclusions. With no positive pattern
    /// nothing is collected.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Glob`] naming the first invalid pattern.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, ScanError> {
        let (include, exclude) = compile_patterns(patterns)?;
        self.include = include;
        self.exclude = exclude;
        Ok(self)
    }

    /// Configures whether to follow symbolic links.
    ///
    /// By default, symbolic links are not followed.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Collects all matching file paths, sorted and de-duplicated.
    ///
    /// Paths that are not valid UTF-8 are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if directory traversal fails.
    pub fn collect_paths(&self) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let mut paths = Vec::new();

        for result in self.build_walker() {
            let entry = result?;

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                warn!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };

            if should_skip_path(relative) || !self.matches(relative) {
                continue;
            }

            paths.push(path.to_owned());
        }

        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    /// Returns `true` if a root-relative path is selected by the patterns.
    #[must_use]
    pub fn matches(&self, relative: &Utf8Path) -> bool {
        let normalized = to_slash(relative);
        self.include.is_match(normalized.as_str()) && !self.exclude.is_match(normalized.as_str())
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            // Enable standard filters (.gitignore, .ignore, hidden files)
            .standard_filters(true)
            .follow_links(self.follow_links)
            // Use a single thread for walking (we parallelize later)
            .threads(1)
            // Don't require the root to be a git repo
            .require_git(false)
            .filter_entry(|entry| {
                !entry.file_type().is_some_and(|ft| ft.is_dir())
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
            })
            .build()
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Splits patterns into include and exclude sets.
fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<(GlobSet, GlobSet), ScanError> {
    let mut include = GlobSetBuilder::new();
    let mut exclude = GlobSetBuilder::new();

    for pattern in patterns {
        let pattern = pattern.as_ref().trim();
        if pattern.is_empty() {
            continue;
        }
        let (builder, glob) = match pattern.strip_prefix('!') {
            Some(negated) => (&mut exclude, negated),
            None => (&mut include, pattern),
        };
        let glob = glob.strip_prefix("./").unwrap_or(glob);
        let compiled = GlobBuilder::new(glob)
            .literal_separator(true)
            .build()
            .map_err(|e| ScanError::glob(pattern, e))?;
        builder.add(compiled);
    }

    let include = include.build().map_err(|e| ScanError::glob("<include set>", e))?;
    let exclude = exclude.build().map_err(|e| ScanError::glob("<exclude set>", e))?;
    Ok((include, exclude))
}

/// Checks if any component of a relative path is a skipped directory.
fn should_skip_path(path: &Utf8Path) -> bool {
    path.components()
        .any(|component| SKIP_DIRECTORIES.contains(&component.as_str()))
}

/// Joins path components with `/` regardless of platform.
pub(crate) fn to_slash(path: &Utf8Path) -> String {
    let mut out = String::with_capacity(path.as_str().len());
    for component in path.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(component.as_str());
    }
    out
}
