//! Pre-compiled tree-sitter queries.
//!
//! This module provides the [`IMPORT_QUERY`] pattern for locating static
//! import statements, and per-grammar accessors that compile it once and
//! cache it for the life of the process.

use std::sync::OnceLock;

use tree_sitter::{Language, Query};

use crate::error::ParseError;
use crate::parser::ScriptKind;

/// Tree-sitter query for static import statements with a string source.
///
/// Clause structure (type-only markers, default and named bindings) is read
/// from the captured statement node by [`extract_imports`].
///
/// # Capture Names
///
/// - `import.source` - The module specifier string literal
/// - `import.statement` - The full `import_statement` node
///
/// [`extract_imports`]: crate::extract_imports
pub const IMPORT_QUERY: &str = r"
; Static imports with a string-literal source
(import_statement
  source: (string) @import.source) @import.statement
";

/// Capture index for `import.source`.
pub const CAPTURE_IMPORT_SOURCE: u32 = 0;

/// Capture index for `import.statement`.
pub const CAPTURE_IMPORT_STATEMENT: u32 = 1;

static COMPILED_QUERY_TS: OnceLock<Query> = OnceLock::new();
static COMPILED_QUERY_TSX: OnceLock<Query> = OnceLock::new();

/// Returns the compiled import query for a grammar.
///
/// The query is compiled once per grammar and cached. Thread-safe.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn import_query(kind: ScriptKind) -> Result<&'static Query, ParseError> {
    let cell = match kind {
        ScriptKind::TypeScript => &COMPILED_QUERY_TS,
        ScriptKind::Tsx => &COMPILED_QUERY_TSX,
    };
    if let Some(query) = cell.get() {
        return Ok(query);
    }

    let query = compile_query(&kind.language(), IMPORT_QUERY)?;
    Ok(cell.get_or_init(|| query))
}

fn compile_query(language: &Language, source: &str) -> Result<Query, ParseError> {
    Query::new(language, source).map_err(|e| ParseError::QueryCompile {
        offset: e.offset,
        kind: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_compiles_for_both_grammars() {
        assert!(import_query(ScriptKind::TypeScript).is_ok());
        assert!(import_query(ScriptKind::Tsx).is_ok());
    }

    #[test]
    fn test_capture_indices_match_names() {
        let query = import_query(ScriptKind::TypeScript).expect("Query should compile");
        assert_eq!(
            query.capture_index_for_name("import.source"),
            Some(CAPTURE_IMPORT_SOURCE)
        );
        assert_eq!(
            query.capture_index_for_name("import.statement"),
            Some(CAPTURE_IMPORT_STATEMENT)
        );
        assert_eq!(query.pattern_count(), 1);
    }
}
