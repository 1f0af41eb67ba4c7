//! Error types for the gc-ts-parser crate.
//!
//! - [`ParseError`] covers parser and query initialization. Source text
//!   itself never produces a `ParseError`: tree-sitter recovers from syntax
//!   errors, which are reported separately as [`SyntaxDiagnostic`]s.
//! - [`EvalError`] covers static evaluation of gallery modules.
//!
//! [`SyntaxDiagnostic`]: crate::SyntaxDiagnostic

use gc_core::SourceLocation;

/// Errors that can occur while setting up or running the parser.
///
/// # Examples
///
/// ```
/// use gc_ts_parser::ParseError;
///
/// fn describe(err: &ParseError) -> &'static str {
///     match err {
///         ParseError::LanguageInit => "grammar",
///         ParseError::QueryCompile { .. } => "query",
///         ParseError::Parse => "parse",
///     }
/// }
/// assert_eq!(describe(&ParseError::Parse), "parse");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to set the TypeScript or TSX grammar on the parser.
    #[error("failed to set TypeScript language")]
    LanguageInit,

    /// Failed to compile a tree-sitter query.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The query error.
        kind: tree_sitter::QueryError,
    },

    /// The parser returned no tree (cancelled or out of memory).
    #[error("failed to parse source code")]
    Parse,
}

/// Errors produced while statically evaluating a module.
///
/// Every variant carries the location of the offending expression so the
/// message can point at the authored source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The module has no `export default`.
    #[error("module has no default export")]
    NoDefaultExport,

    /// An expression form outside the statically evaluable subset.
    #[error("{location}: cannot statically evaluate {kind} `{snippet}`")]
    Unsupported {
        /// Where the expression starts.
        location: SourceLocation,
        /// Tree-sitter node kind.
        kind: String,
        /// Leading source text of the expression.
        snippet: String,
    },

    /// An identifier with no visible binding.
    #[error("{location}: unresolved identifier `{name}`")]
    Unresolved {
        /// Where the identifier appears.
        location: SourceLocation,
        /// The identifier.
        name: String,
    },

    /// A `const` whose initializer depends on itself.
    #[error("{location}: cyclic initializer for `{name}`")]
    Cycle {
        /// Where the identifier appears.
        location: SourceLocation,
        /// The identifier.
        name: String,
    },

    /// An operation applied to a value of the wrong type.
    #[error("{location}: {message}")]
    Type {
        /// Where the operation appears.
        location: SourceLocation,
        /// What went wrong.
        message: String,
    },
}

impl EvalError {
    /// Location of the offending expression, if any.
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Self::NoDefaultExport => None,
            Self::Unsupported { location, .. }
            | Self::Unresolved { location, .. }
            | Self::Cycle { location, .. }
            | Self::Type { location, .. } => Some(*location),
        }
    }
}
