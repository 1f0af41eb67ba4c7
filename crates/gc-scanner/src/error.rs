//! Error types for the gc-scanner crate.
//!
//! - [`ScanError`] covers directory traversal, file I/O, parser setup and
//!   glob compilation.
//! - [`LoadError`] covers loading a gallery module into catalog sections.

use camino::Utf8PathBuf;
use gc_ts_parser::{EvalError, ParseError};

/// Errors that can occur during scanning operations.
///
/// # Error Strategy
///
/// A catalog build reads every tracked file; an unreadable file would
/// silently drop usage edges or barrel exports, so no variant is skipped.
/// [`ScanError::is_fatal`] exists for callers that walk optional trees.
///
/// # Examples
///
/// ```
/// use gc_scanner::ScanError;
///
/// fn handle_error(err: ScanError) {
///     match err {
///         ScanError::Walk(e) => eprintln!("Walk error: {e}"),
///         ScanError::Read { path, .. } => eprintln!("Read error: {path}"),
///         ScanError::Write { path, .. } => eprintln!("Write error: {path}"),
///         ScanError::Parser(e) => eprintln!("Parser error: {e}"),
///         ScanError::Glob { pattern, .. } => eprintln!("Bad pattern: {pattern}"),
///         ScanError::ThreadPool(e) => eprintln!("Thread pool: {e}"),
///         ScanError::Config(msg) => eprintln!("Config error: {msg}"),
///         ScanError::NonUtf8Path(p) => eprintln!("Invalid path: {}", p.display()),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk a directory.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a file or its metadata.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output or cache file.
    #[error("failed to write file {path}: {source}")]
    Write {
        /// The path of the file that couldn't be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TypeScript parser could not be initialized.
    #[error("failed to initialize parser: {0}")]
    Parser(#[from] ParseError),

    /// A tracked-file pattern is not a valid glob.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        /// The pattern as configured.
        pattern: String,
        /// The underlying glob error.
        #[source]
        source: globset::Error,
    },

    /// The analysis thread pool could not be created.
    #[error("failed to build analysis thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Invalid scanner configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Glob`] error.
    #[inline]
    pub fn glob(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::Glob {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` if this error must abort the run.
    ///
    /// Only a non-UTF-8 path is survivable: the walker logs and skips it.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => Some(path),
            Self::Walk(_)
            | Self::Parser(_)
            | Self::Glob { .. }
            | Self::ThreadPool(_)
            | Self::Config(_)
            | Self::NonUtf8Path(_) => None,
        }
    }
}

/// Errors that can occur while loading a gallery module.
///
/// Every variant names the module; shape errors also name the offending
/// field as a path from the default export, e.g.
/// `default[0].entries[2].preview.id`.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The module could not be read.
    #[error("failed to read gallery module {path}: {source}")]
    Read {
        /// The module path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The parser could not be initialized.
    #[error("failed to parse gallery module {path}: {source}")]
    Parse {
        /// The module path.
        path: Utf8PathBuf,
        /// The underlying parser error.
        #[source]
        source: ParseError,
    },

    /// The module has syntax errors.
    #[error("gallery module {path} has a syntax error at {diagnostic}")]
    Syntax {
        /// The module path.
        path: Utf8PathBuf,
        /// The first diagnostic, as `line:column: message`.
        diagnostic: String,
    },

    /// The default export could not be statically evaluated.
    #[error("failed to evaluate gallery module {path}: {source}")]
    Eval {
        /// The module path.
        path: Utf8PathBuf,
        /// The evaluation error.
        #[source]
        source: EvalError,
    },

    /// The default export evaluated to the wrong shape.
    #[error("invalid gallery module {path}: `{field}` {message}")]
    Shape {
        /// The module path.
        path: Utf8PathBuf,
        /// Path of the offending field from the default export.
        field: String,
        /// What was expected.
        message: String,
    },

    /// A section declared an id outside the known set.
    #[error("invalid gallery module {path}: `{field}` is not a known section id: '{id}'")]
    UnknownSection {
        /// The module path.
        path: Utf8PathBuf,
        /// Path of the `id` field.
        field: String,
        /// The declared id.
        id: String,
    },
}

impl LoadError {
    /// Creates a new [`LoadError::Shape`] error.
    pub fn shape(
        path: impl Into<Utf8PathBuf>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Shape {
            path: path.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the module path.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Syntax { path, .. }
            | Self::Eval { path, .. }
            | Self::Shape { path, .. }
            | Self::UnknownSection { path, .. } => path,
        }
    }

    /// Returns the offending field path, for shape errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Shape { field, .. } | Self::UnknownSection { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_scan_error_read() {
        let err = ScanError::read("src/foo.ts", io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert!(err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("src/foo.ts"));
        assert!(err.to_string().contains("src/foo.ts"));
    }

    #[test]
    fn test_scan_error_glob() {
        let source = globset::Glob::new("src/[").expect_err("unclosed class");
        let err = ScanError::glob("src/[", source);
        assert!(err.to_string().contains("src/["));
        assert!(err.path().is_none());
    }

    #[test]
    fn test_scan_error_non_utf8_is_not_fatal() {
        use std::path::PathBuf;
        let err = ScanError::NonUtf8Path(PathBuf::from("test"));
        assert!(!err.is_fatal());
        assert!(err.path().is_none());
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::Config("test error".to_owned());
        assert_eq!(err.to_string(), "invalid configuration: test error");
    }

    #[test]
    fn test_load_error_shape_names_field() {
        let err = LoadError::shape(
            "src/ui/Button.gallery.tsx",
            "default[0].entries[2].preview.id",
            "must be a string",
        );
        let msg = err.to_string();
        assert!(msg.contains("Button.gallery.tsx"));
        assert!(msg.contains("default[0].entries[2].preview.id"));
        assert_eq!(err.field(), Some("default[0].entries[2].preview.id"));
        assert_eq!(err.path().as_str(), "src/ui/Button.gallery.tsx");
    }

    #[test]
    fn test_load_error_eval_has_no_field() {
        let err = LoadError::Eval {
            path: Utf8PathBuf::from("a.gallery.tsx"),
            source: EvalError::NoDefaultExport,
        };
        assert!(err.field().is_none());
        assert!(err.to_string().contains("no default export"));
    }
}
