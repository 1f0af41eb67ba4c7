//! TypeScript parser management using tree-sitter.
//!
//! This module provides the [`TsParser`] struct for parsing TypeScript and
//! TSX files and extracting their imports and exports, plus [`Parsers`], a
//! pair of parsers that dispatches on file extension.

use camino::Utf8Path;
use gc_core::{ExportSummary, ImportSymbol};
use smallvec::SmallVec;
use tree_sitter::{Language, Parser, Query, Tree};

use crate::error::ParseError;
use crate::exports::extract_exports;
use crate::import::extract_imports;
use crate::queries::import_query;

/// Grammar used to parse a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`, `.d.ts`).
    TypeScript,
    /// TypeScript with JSX. Also used for `.js`/`.jsx` and unknown extensions,
    /// since the TSX grammar accepts both.
    Tsx,
}

impl ScriptKind {
    /// Infers the grammar from a file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use gc_ts_parser::ScriptKind;
    ///
    /// assert_eq!(ScriptKind::from_path(Utf8Path::new("a/button.ts")), ScriptKind::TypeScript);
    /// assert_eq!(ScriptKind::from_path(Utf8Path::new("a/button.d.ts")), ScriptKind::TypeScript);
    /// assert_eq!(ScriptKind::from_path(Utf8Path::new("a/page.tsx")), ScriptKind::Tsx);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("ts" | "mts" | "cts") => Self::TypeScript,
            _ => Self::Tsx,
        }
    }

    /// Returns the tree-sitter language for this grammar.
    #[must_use]
    pub fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Imports and exports of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAnalysis {
    /// Value imports, in source order.
    ///
    /// Uses `SmallVec<[ImportSymbol; 8]>` to avoid heap allocation for
    /// typical files with 8 or fewer imported names.
    pub imports: SmallVec<[ImportSymbol; 8]>,

    /// Exported surface.
    pub exports: ExportSummary,
}

/// TypeScript parser for extracting imports and exports from source files.
///
/// Wraps a tree-sitter parser configured for one grammar. The parser can be
/// reused for multiple files to avoid repeated initialization.
///
/// # Thread Safety
///
/// `TsParser` is `Send` but not `Sync`. For parallel analysis with rayon,
/// create one parser per worker with `map_init`. The compiled import query
/// is shared by all instances.
///
/// # Examples
///
/// ```
/// use gc_ts_parser::{ScriptKind, TsParser};
///
/// let mut parser = TsParser::for_kind(ScriptKind::Tsx)?;
/// let source = r#"
/// import { Button } from "@/components/ui/button";
/// export default function Page() { return <Button />; }
/// "#;
/// let analysis = parser.analyze(source)?;
///
/// assert_eq!(analysis.imports[0].name, "Button");
/// assert!(analysis.exports.has_default);
/// # Ok::<(), gc_ts_parser::ParseError>(())
/// ```
pub struct TsParser {
    parser: Parser,
    kind: ScriptKind,
}

impl TsParser {
    /// Creates a parser for the given grammar.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the grammar cannot be set on
    /// the parser.
    pub fn for_kind(kind: ScriptKind) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&kind.language())
            .map_err(|_| ParseError::LanguageInit)?;
        Ok(Self { parser, kind })
    }

    /// Returns the grammar this parser was created for.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    /// Parses source code into a syntax tree.
    ///
    /// Syntax errors do not fail the parse; tree-sitter recovers and marks
    /// the offending regions with `ERROR` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Parse`] if tree-sitter returns no tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, ParseError> {
        self.parser.parse(source, None).ok_or(ParseError::Parse)
    }

    /// Parses source code and extracts its imports and exports.
    ///
    /// # Errors
    ///
    /// - Returns [`ParseError::Parse`] if parsing fails
    /// - Returns [`ParseError::QueryCompile`] if the import query fails to compile
    pub fn analyze(&mut self, source: &str) -> Result<FileAnalysis, ParseError> {
        let tree = self.parse(source)?;
        let query = self.query()?;
        Ok(FileAnalysis {
            imports: extract_imports(&tree, source, query),
            exports: extract_exports(&tree, source),
        })
    }

    fn query(&self) -> Result<&'static Query, ParseError> {
        import_query(self.kind)
    }
}

impl std::fmt::Debug for TsParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsParser")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// One parser per grammar, selected by file extension.
///
/// This is the unit of per-worker state in parallel analysis.
#[derive(Debug)]
pub struct Parsers {
    typescript: TsParser,
    tsx: TsParser,
}

impl Parsers {
    /// Creates both parsers.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if either grammar fails to load.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            typescript: TsParser::for_kind(ScriptKind::TypeScript)?,
            tsx: TsParser::for_kind(ScriptKind::Tsx)?,
        })
    }

    /// Returns the parser matching `path`'s extension.
    pub fn for_path(&mut self, path: &Utf8Path) -> &mut TsParser {
        match ScriptKind::from_path(path) {
            ScriptKind::TypeScript => &mut self.typescript,
            ScriptKind::Tsx => &mut self.tsx,
        }
    }

    /// Analyzes `source` with the grammar matching `path`.
    ///
    /// # Errors
    ///
    /// See [`TsParser::analyze`].
    pub fn analyze(&mut self, source: &str, path: &Utf8Path) -> Result<FileAnalysis, ParseError> {
        self.for_path(path).analyze(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_for_both_kinds() {
        assert!(TsParser::for_kind(ScriptKind::TypeScript).is_ok());
        assert!(TsParser::for_kind(ScriptKind::Tsx).is_ok());
    }

    #[test]
    fn test_script_kind_from_path() {
        assert_eq!(
            ScriptKind::from_path(Utf8Path::new("lib/util.mts")),
            ScriptKind::TypeScript
        );
        assert_eq!(ScriptKind::from_path(Utf8Path::new("legacy.jsx")), ScriptKind::Tsx);
        assert_eq!(ScriptKind::from_path(Utf8Path::new("Makefile")), ScriptKind::Tsx);
    }

    #[test]
    fn test_analyze_imports_and_exports() {
        let mut parser = TsParser::for_kind(ScriptKind::Tsx).expect("Parser creation failed");
        let source = r#"
import { Card, type CardProps } from "@/components/ui/card";
import Link from "next/link";

export interface PageProps { title: string }
export const revalidate = 60;
export default function Page({ title }: PageProps) {
  return <Card><Link href="/">{title}</Link></Card>;
}
"#;
        let analysis = parser.analyze(source).expect("Analyze failed");
        let names: Vec<_> = analysis.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Card", "Link"]);
        assert_eq!(analysis.exports.value, ["revalidate"]);
        assert_eq!(analysis.exports.types, ["PageProps"]);
        assert!(analysis.exports.has_default);
    }

    #[test]
    fn test_analyze_recovers_from_syntax_errors() {
        let mut parser = TsParser::for_kind(ScriptKind::TypeScript).expect("Parser creation failed");
        let source = "import { A } from './a';\nexport const = ;\nexport type T = string;";
        let analysis = parser.analyze(source).expect("Analyze should not fail");
        assert_eq!(analysis.imports.len(), 1);
        assert!(analysis.exports.types.contains(&"T".to_owned()));
    }

    #[test]
    fn test_parsers_dispatch_on_extension() {
        let mut parsers = Parsers::new().expect("Parser creation failed");
        assert_eq!(
            parsers.for_path(Utf8Path::new("a.ts")).kind(),
            ScriptKind::TypeScript
        );
        assert_eq!(parsers.for_path(Utf8Path::new("a.tsx")).kind(), ScriptKind::Tsx);

        // Angle-bracket assertion is only valid in the plain TypeScript grammar
        let source = "export const id = <string>value;";
        let analysis = parsers
            .analyze(source, Utf8Path::new("id.ts"))
            .expect("Analyze failed");
        assert_eq!(analysis.exports.value, ["id"]);
    }
}
