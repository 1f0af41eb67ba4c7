//! Catalog assembly for the component gallery.
//!
//! `gc-catalog` turns the sections loaded by `gc-scanner` into the files the
//! gallery application consumes at runtime: a merged registry, a sorted list
//! of preview routes, a TypeScript manifest with its JSON mirror, and barrel
//! files re-exporting each component directory.
//!
//! # Overview
//!
//! - [`RegistryBuilder`]: merges sections, groups entries by kind, and
//!   rejects duplicate preview ids
//! - [`generate_routes`]: one route per preview per theme combination,
//!   with unique slugs
//! - [`ManifestWriter`]: renders, validates, then atomically writes the
//!   manifest, runtime JSON, entrypoint and usage file
//! - [`generate_barrel`] / [`write_barrel`]: cached barrel generation
//! - [`BuildContext`]: per-run configuration, resolver and analyzer
//! - [`run_usage`] / [`run_barrel`]: the pipelines the CLI drives
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use gc_catalog::{run_usage, BuildContext, Outcome};
//! use gc_core::Config;
//!
//! let root = Utf8Path::new("/repo");
//! let ctx = BuildContext::new(root, Config::load(root, None)?)?;
//!
//! match run_usage(&ctx, false)? {
//!     Outcome::Skipped => println!("up to date"),
//!     Outcome::Completed(report) => println!("{} routes", report.routes),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Pipeline
//!
//! ```text
//! run_usage
//!     │
//!     ├── CacheStore::has_changes ──► Skipped
//!     ├── load_gallery_modules ──► RegistryBuilder
//!     ├── discover_routes + correlate ──► Registry::apply_usage
//!     ├── generate_routes
//!     └── ManifestWriter::write ──► CacheStore::write
//! ```
//!
//! Every error is fatal to the run. Outputs are validated in memory before
//! the first byte is written.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod barrel;
mod context;
mod error;
mod manifest;
mod pipeline;
mod registry;
mod routes;
mod slug;

pub use barrel::{barrel_files, generate_barrel, to_export_name, write_barrel, BarrelOutput};
pub use context::BuildContext;
pub use error::{CatalogError, ValidationError};
pub use manifest::{
    check_on_disk, check_runtime_on_disk, checksum, emit, entrypoint_source, runtime_json,
    usage_json, validate, ManifestFiles, ManifestWriter, WrittenManifest, REQUIRED_EXPORTS,
};
pub use pipeline::{
    barrel_changed, load_registry, preview_routes, run_barrel, run_usage, usage_changed,
    BarrelReport, Outcome, UsageReport,
};
pub use registry::{PreviewMap, Registry, RegistryBuilder};
pub use routes::generate_routes;
pub use slug::normalize_slug;
