//! TypeScript front-end using tree-sitter.
//!
//! This crate turns TypeScript and TSX source into the facts the catalog
//! build needs:
//!
//! - Value imports (name + specifier) for usage correlation
//! - The export surface (values, types, default) for barrel generation
//! - Syntax diagnostics for validating generated modules
//! - A static value tree for a gallery module's default export
//!
//! # Overview
//!
//! [`TsParser`] wraps a tree-sitter parser for one grammar; [`Parsers`]
//! holds one of each and picks by file extension:
//!
//! ```
//! use camino::Utf8Path;
//! use gc_ts_parser::Parsers;
//!
//! let mut parsers = Parsers::new()?;
//! let source = r#"
//! import { Button, type ButtonProps } from "@/components/ui";
//! export type { ButtonProps };
//! export default function Page() { return <Button />; }
//! "#;
//!
//! let analysis = parsers.analyze(source, Utf8Path::new("src/app/page.tsx"))?;
//! assert_eq!(analysis.imports.len(), 1);
//! assert_eq!(analysis.exports.types, ["ButtonProps"]);
//! assert!(analysis.exports.has_default);
//! # Ok::<(), gc_ts_parser::ParseError>(())
//! ```
//!
//! # Error Recovery
//!
//! tree-sitter always produces a tree. Extraction works on whatever parsed;
//! use [`validate_syntax`] when a file must be syntactically clean.
//!
//! # Static Evaluation
//!
//! [`evaluate_default_export`] reduces a module's default export to a
//! [`StaticValue`] without executing code. See the [`evaluate`] module for
//! the supported expression forms.
//!
//! # Thread Safety
//!
//! Parsers are `Send` but not `Sync`: create one per worker thread. The
//! compiled import queries are shared process-wide.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod evaluate;
mod exports;
mod import;
mod node;
mod parser;
pub mod queries;
mod syntax;
pub mod value;

// Re-export main types for convenient access
pub use error::{EvalError, ParseError};
pub use evaluate::evaluate_default_export;
pub use parser::{FileAnalysis, Parsers, ScriptKind, TsParser};
pub use syntax::{collect_diagnostics, validate_syntax, SyntaxDiagnostic};
pub use value::{ObjectValue, StaticValue};

// Re-export extraction functions
pub use exports::extract_exports;
pub use import::extract_imports;
