//! Error types for the gc-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration failures.
//! Every variant is fatal at startup: a run never proceeds with a
//! configuration it could not read.

use camino::Utf8PathBuf;

/// Errors that can occur while loading or validating configuration,
/// including the project's `tsconfig`.
///
/// # Examples
///
/// ```
/// use gc_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingFile(Utf8PathBuf::from("/repo/tsconfig.json"));
/// assert!(error.to_string().contains("/repo/tsconfig.json"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("missing configuration file: {0}")]
    MissingFile(Utf8PathBuf),

    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// Failed to read a configuration file.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the tool configuration file.
    #[error("failed to parse configuration '{path}': {source}")]
    Parse {
        /// File that could not be parsed.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse a TypeScript project configuration.
    #[error("failed to parse tsconfig '{path}': {reason}")]
    Tsconfig {
        /// The tsconfig file.
        path: Utf8PathBuf,
        /// Parser message.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an [`InvalidOption`](Self::InvalidOption) error.
    #[must_use]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// The file this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::MissingFile(path)
            | Self::InvalidPath { path, .. }
            | Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Tsconfig { path, .. } => Some(path),
            Self::InvalidOption { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("maxParallelJobs", "must be positive");
        let msg = error.to_string();
        assert!(msg.contains("maxParallelJobs"));
        assert!(msg.contains("must be positive"));
        assert!(error.path().is_none());
    }

    #[test]
    fn test_tsconfig_display() {
        let error = ConfigError::Tsconfig {
            path: Utf8PathBuf::from("tsconfig.build.json"),
            reason: "unexpected '}'".to_owned(),
        };
        assert!(error.to_string().contains("tsconfig.build.json"));
        assert_eq!(
            error.path().map(Utf8PathBuf::as_path).map(Utf8Path::as_str),
            Some("tsconfig.build.json")
        );
    }
}
