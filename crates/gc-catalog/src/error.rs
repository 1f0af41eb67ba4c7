//! Error types for the gc-catalog crate.

use camino::Utf8PathBuf;
use gc_core::{ConfigError, RenderHandle};
use gc_scanner::{LoadError, ScanError};
use gc_ts_parser::{ParseError, SyntaxDiagnostic};

/// Errors that abort a catalog or barrel build.
///
/// # Error Strategy
///
/// There is no partial-success mode: every variant aborts the run before
/// any output is written. Identity collisions name the offending id so the
/// message alone is enough to find the duplicate.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two previews share an id.
    #[error("duplicate preview id '{id}': first defined at {first}, redefined at {second}")]
    DuplicatePreviewId {
        /// The colliding preview id.
        id: String,
        /// The render function registered first.
        first: RenderHandle,
        /// The render function that collided.
        second: RenderHandle,
    },

    /// Two preview routes produced the same slug.
    #[error("duplicate gallery preview slug generated: {0}")]
    DuplicateSlug(String),

    /// The registry violates a constraint the types cannot express.
    #[error("invalid registry: `{field}` {message}")]
    Schema {
        /// Path of the offending field in the payload.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Generated manifest source failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The manifest on disk is missing or unusable.
    #[error("gallery manifest at {path} is stale: {reason}. Run `gallery-gen usage` to regenerate {path}")]
    StaleManifest {
        /// Manifest path.
        path: Utf8PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A barrel target name is not configured.
    #[error("unknown barrel target '{0}'")]
    UnknownBarrel(String),

    /// JSON serialization failed.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        /// What was being serialized.
        what: &'static str,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Scanning, reading or writing files failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A gallery module could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Configuration or tsconfig problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The TypeScript front-end could not be initialized.
    #[error(transparent)]
    Parser(#[from] ParseError),
}

/// Why generated manifest source was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required export signature is absent.
    #[error("generated gallery manifest is missing required export: \"{0}\"")]
    MissingExport(&'static str),

    /// The source does not parse cleanly.
    #[error("generated gallery manifest contains syntax errors:\n{}", format_diagnostics(.0))]
    Syntax(Vec<SyntaxDiagnostic>),
}

fn format_diagnostics(diagnostics: &[SyntaxDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl CatalogError {
    /// Creates a new [`CatalogError::Schema`] error.
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new [`CatalogError::StaleManifest`] error.
    pub fn stale(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::StaleManifest {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new [`CatalogError::Serialize`] error.
    pub fn serialize(what: &'static str, source: serde_json::Error) -> Self {
        Self::Serialize { what, source }
    }

    /// Returns `true` if this error must abort the run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Scan(e) => e.is_fatal(),
            _ => true,
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::DuplicatePreviewId { second, .. } => Some(&second.file),
            Self::StaleManifest { path, .. } => Some(path),
            Self::Scan(e) => e.path(),
            Self::Load(e) => Some(e.path()),
            Self::Config(e) => e.path(),
            Self::DuplicateSlug(_)
            | Self::Schema { .. }
            | Self::Validation(_)
            | Self::UnknownBarrel(_)
            | Self::Serialize { .. }
            | Self::Parser(_) => None,
        }
    }
}
