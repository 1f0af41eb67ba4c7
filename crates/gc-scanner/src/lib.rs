//! Source scanning, module resolution, and usage correlation for the
//! gallery catalog.
//!
//! This crate is the file-facing half of the catalog build. It finds
//! TypeScript files, analyzes them in parallel with `gc-ts-parser`, resolves
//! their imports the way the TypeScript compiler would, and loads gallery
//! modules into catalog sections.
//!
//! # Overview
//!
//! - [`SourceWalker`]: directory traversal filtered by glob patterns,
//!   respecting `.gitignore`
//! - [`FileAnalyzer`]: parallel import/export extraction on a bounded rayon
//!   pool
//! - [`ModuleResolver`]: `tsconfig`-aware import resolution
//! - [`correlate`]: the entry id to route usage map
//! - [`StaticModuleLoader`]: gallery modules to [`gc_core::CatalogSection`]s
//!   through static evaluation
//! - [`CacheStore`] / [`BarrelCache`]: persisted mtime caches
//! - [`write_atomic`]: temp-file-then-rename output
//! - [`ScanStats`]: atomic counters for reporting
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use camino::Utf8Path;
//! use gc_scanner::{
//!     build_name_lookup, correlate, discover_routes, FileAnalyzer, ModuleResolver, ScanStats,
//! };
//!
//! let root = Utf8Path::new("/repo");
//! let resolver = ModuleResolver::from_tsconfig(root, &root.join("tsconfig.json"))?;
//! let analyzer = FileAnalyzer::new(None, Arc::new(ScanStats::new()))?;
//! let routes = discover_routes(&root.join("src/app"))?;
//!
//! let usage = correlate(&routes, &build_name_lookup(&[]), &analyzer, &resolver)?;
//! println!("{} entries tracked", usage.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! correlate
//!     │
//!     ├── SourceWalker (collect paths per route)
//!     │       └── WalkBuilder (ignore crate) + GlobSet
//!     │
//!     ├── FileAnalyzer (parallel parsing)
//!     │       └── Parsers per worker (gc-ts-parser)
//!     │
//!     └── ModuleResolver (tsconfig paths, baseUrl, node_modules)
//! ```
//!
//! # Concurrency
//!
//! Only file analysis runs in parallel. Loading, resolution and every
//! aggregation step run on the calling thread after analysis has finished,
//! so output order never depends on scheduling.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod analyzer;
mod cache;
mod error;
mod loader;
mod output;
mod resolver;
mod stats;
mod tsconfig;
mod usage;
mod walker;

pub use analyzer::{AnalyzedFile, FileAnalyzer};
pub use cache::{mtime_ms, BarrelCache, CacheStore};
pub use error::{LoadError, ScanError};
pub use loader::{
    format_import_path, load_gallery_modules, GalleryModule, ModuleLoader, StaticModuleLoader,
};
pub use output::write_atomic;
pub use resolver::{normalize_path, ModuleResolver};
pub use stats::{ScanStats, StatsSnapshot};
pub use tsconfig::{load_compiler_paths, CompilerPaths, PathMapping};
pub use usage::{build_name_lookup, correlate, discover_routes, format_route, NameLookup, RouteDir};
pub use walker::SourceWalker;
