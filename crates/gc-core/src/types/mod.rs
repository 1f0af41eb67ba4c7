//! Domain types for the gallery-catalog tool.
//!
//! # Module Organization
//!
//! - [`catalog`] - Sections, entries, previews, and their serializable mirror
//! - [`route`] - Theme combinations and preview routes
//! - [`analysis`] - Per-file import and export summaries
//! - [`cache`] - Incremental cache records
//! - [`location`] - Source positions
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use gc_core::{CatalogEntry, PreviewRoute, SectionId};
//! ```

mod analysis;
mod cache;
mod catalog;
mod location;
mod route;

pub use analysis::{ExportSummary, ImportSymbol, UsageMap};
pub use cache::{BarrelCacheRecord, BarrelManifest, CacheManifest, CacheRecord};
pub use catalog::{
    Axis, AxisKind, AxisValue, ByKind, CatalogEntry, CatalogSection, EntryKind,
    Preview, PropMeta, RegistryPayload, RelatedSurface, RenderHandle, SectionId,
    SerializableEntry, SerializablePreview, SerializableSection, SerializableState,
    StateDefinition, UsageNote, UsageNoteKind,
};
pub use location::SourceLocation;
pub use route::{PreviewRoute, ThemeBackground, ThemeCombo, ThemeVariant};
