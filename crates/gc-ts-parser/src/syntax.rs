//! Syntax validation for generated TypeScript.
//!
//! tree-sitter never rejects input outright. Instead it inserts `ERROR`
//! nodes around text it cannot place and zero-width "missing" nodes where
//! it expected a token. Both are collected here as [`SyntaxDiagnostic`]s.

use gc_core::SourceLocation;
use tree_sitter::{Node, Tree};

use crate::error::ParseError;
use crate::node::{node_location, node_text};
use crate::parser::{ScriptKind, TsParser};

/// Longest snippet of offending text kept in a diagnostic.
const SNIPPET_LEN: usize = 40;

/// One syntax problem in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    /// Where the problem starts.
    pub location: SourceLocation,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Parses `source` with the given grammar and returns every syntax problem.
///
/// An empty list means the source is syntactically valid.
///
/// # Errors
///
/// Returns a [`ParseError`] only if the parser itself cannot be set up.
///
/// # Examples
///
/// ```
/// use gc_ts_parser::{validate_syntax, ScriptKind};
///
/// assert!(validate_syntax("export const a = 1;", ScriptKind::TypeScript)?.is_empty());
/// assert!(!validate_syntax("export const a = ;", ScriptKind::TypeScript)?.is_empty());
/// # Ok::<(), gc_ts_parser::ParseError>(())
/// ```
pub fn validate_syntax(source: &str, kind: ScriptKind) -> Result<Vec<SyntaxDiagnostic>, ParseError> {
    let mut parser = TsParser::for_kind(kind)?;
    let tree = parser.parse(source)?;
    Ok(collect_diagnostics(&tree, source))
}

/// Collects diagnostics from an already-parsed tree, in source order.
pub fn collect_diagnostics(tree: &Tree, source: &str) -> Vec<SyntaxDiagnostic> {
    let mut diagnostics = Vec::new();
    let root = tree.root_node();
    if root.has_error() {
        visit(root, source.as_bytes(), &mut diagnostics);
    }
    diagnostics
}

fn visit(node: Node<'_>, source: &[u8], out: &mut Vec<SyntaxDiagnostic>) {
    if node.is_missing() {
        out.push(SyntaxDiagnostic {
            location: node_location(node),
            message: format!("missing `{}`", node.kind()),
        });
        return;
    }
    if node.is_error() {
        out.push(SyntaxDiagnostic {
            location: node_location(node),
            message: format!("unexpected `{}`", snippet(node, source)),
        });
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            visit(child, source, out);
        }
    }
}

fn snippet(node: Node<'_>, source: &[u8]) -> String {
    let text = node_text(node, source).unwrap_or_default();
    let first_line = text.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > SNIPPET_LEN {
        let cut: String = first_line.chars().take(SNIPPET_LEN).collect();
        format!("{cut}…")
    } else {
        first_line.to_owned()
    }
}
