//! Core types, errors, and configuration for the gallery-catalog tool.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - The catalog data model ([`CatalogSection`], [`CatalogEntry`], [`Preview`])
//!   and its render-free serializable mirror ([`SerializableSection`],
//!   [`SerializableEntry`], [`RegistryPayload`])
//! - Preview routing types ([`PreviewRoute`], [`ThemeVariant`], [`ThemeBackground`])
//! - Per-file analysis results ([`ImportSymbol`], [`ExportSummary`])
//! - Incremental cache records ([`CacheManifest`], [`BarrelCacheRecord`])
//! - Configuration ([`Config`]) and its error type ([`ConfigError`])
//!
//! The serializable types mirror the JSON shapes consumed by the gallery
//! application, so field names serialize in `camelCase` and absent optional
//! fields are omitted.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{BarrelTarget, Config, EngineConfig, PreviewConfig};
pub use error::ConfigError;
pub use types::{
    Axis, AxisKind, AxisValue, BarrelCacheRecord, BarrelManifest, ByKind, CacheManifest,
    CacheRecord, CatalogEntry, CatalogSection, EntryKind, ExportSummary,
    ImportSymbol, Preview, PreviewRoute, PropMeta, RegistryPayload, RelatedSurface,
    RenderHandle, SectionId, SerializableEntry, SerializablePreview, SerializableSection,
    SerializableState, SourceLocation, StateDefinition, ThemeBackground, ThemeCombo,
    ThemeVariant, UsageMap, UsageNote, UsageNoteKind,
};
