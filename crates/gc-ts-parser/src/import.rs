//! Import extraction from TypeScript syntax trees.
//!
//! Only value imports with a string-literal specifier are reported:
//!
//! | Source | Reported names |
//! |--------|----------------|
//! | `import Button from "./button"` | `Button` |
//! | `import { Card, Badge as B } from "./ui"` | `Card`, `Badge` |
//! | `import Root, { Item } from "./menu"` | `Root`, `Item` |
//! | `import { type Props, Icon } from "./icon"` | `Icon` |
//! | `import type { Props } from "./icon"` | nothing |
//! | `import * as ui from "./ui"` | nothing |
//! | `import "./styles.css"` | nothing |
//!
//! Named bindings report the name the target module exports, not the local
//! alias, since usage analysis matches names against catalog entries.

use gc_core::ImportSymbol;
use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

use crate::node::{has_token, module_export_name, string_value};
use crate::queries::{CAPTURE_IMPORT_SOURCE, CAPTURE_IMPORT_STATEMENT};

/// Extracts value imports from a parsed tree.
///
/// Uses `SmallVec<[ImportSymbol; 8]>` to avoid heap allocation for typical
/// files.
///
/// # Examples
///
/// ```ignore
/// let query = import_query(ScriptKind::Tsx)?;
/// let imports = extract_imports(&tree, source, query);
/// ```
pub fn extract_imports(tree: &Tree, source: &str, query: &Query) -> SmallVec<[ImportSymbol; 8]> {
    let bytes = source.as_bytes();
    let mut imports = SmallVec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), bytes);

    while let Some(query_match) = matches.next() {
        let mut statement = None;
        let mut specifier = None;

        for capture in query_match.captures {
            match capture.index {
                CAPTURE_IMPORT_STATEMENT => statement = Some(capture.node),
                CAPTURE_IMPORT_SOURCE => specifier = string_value(capture.node, bytes),
                _ => {}
            }
        }

        let (Some(statement), Some(specifier)) = (statement, specifier) else {
            continue;
        };
        collect_statement(statement, bytes, &specifier, &mut imports);
    }

    imports
}

/// Appends the value bindings of one `import_statement`.
fn collect_statement(
    statement: Node<'_>,
    source: &[u8],
    specifier: &str,
    out: &mut SmallVec<[ImportSymbol; 8]>,
) {
    // `import type { .. }` and `import typeof ..` bring no values into scope
    if has_token(statement, "type") || has_token(statement, "typeof") {
        return;
    }

    let mut cursor = statement.walk();
    let Some(clause) = statement
        .named_children(&mut cursor)
        .find(|child| child.kind() == "import_clause")
    else {
        return;
    };

    let mut clause_cursor = clause.walk();
    for binding in clause.named_children(&mut clause_cursor) {
        match binding.kind() {
            "identifier" => {
                if let Some(name) = module_export_name(binding, source) {
                    out.push(ImportSymbol::new(name, specifier));
                }
            }
            "named_imports" => collect_named(binding, source, specifier, out),
            _ => {}
        }
    }
}

fn collect_named(
    named: Node<'_>,
    source: &[u8],
    specifier: &str,
    out: &mut SmallVec<[ImportSymbol; 8]>,
) {
    let mut cursor = named.walk();
    for element in named.named_children(&mut cursor) {
        if element.kind() != "import_specifier" {
            continue;
        }
        if has_token(element, "type") || has_token(element, "typeof") {
            continue;
        }
        let Some(name) = element
            .child_by_field_name("name")
            .and_then(|node| module_export_name(node, source))
        else {
            continue;
        };
        out.push(ImportSymbol::new(name, specifier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ScriptKind;
    use crate::queries::import_query;
    use tree_sitter::Parser;

    fn imports_of(source: &str) -> Vec<(String, String)> {
        let mut parser = Parser::new();
        parser
            .set_language(&ScriptKind::Tsx.language())
            .expect("Failed to set language");
        let tree = parser.parse(source, None).expect("Parse failed");
        let query = import_query(ScriptKind::Tsx).expect("Query should compile");
        extract_imports(&tree, source, query)
            .into_iter()
            .map(|symbol| (symbol.name, symbol.specifier))
            .collect()
    }

    #[test]
    fn test_extract_default_and_named() {
        let imports = imports_of(r#"import Root, { Item, Other as Alias } from "./menu";"#);
        assert_eq!(
            imports,
            [
                ("Root".to_owned(), "./menu".to_owned()),
                ("Item".to_owned(), "./menu".to_owned()),
                ("Other".to_owned(), "./menu".to_owned()),
            ]
        );
    }

    #[test]
    fn test_skip_type_only_clause() {
        assert!(imports_of(r#"import type { Props } from "./button";"#).is_empty());
        assert!(imports_of(r#"import type Button from "./button";"#).is_empty());
    }

    #[test]
    fn test_skip_type_only_elements() {
        let imports = imports_of(r#"import { type Props, Button } from "./button";"#);
        assert_eq!(imports, [("Button".to_owned(), "./button".to_owned())]);
    }

    #[test]
    fn test_skip_namespace_and_side_effect() {
        let source = r#"
import * as ui from "@/components/ui";
import "./globals.css";
"#;
        assert!(imports_of(source).is_empty());
    }

    #[test]
    fn test_decodes_specifier_quotes() {
        let imports = imports_of(r"import { Card } from '@/components/ui/Card';");
        assert_eq!(imports[0].1, "@/components/ui/Card");
    }

    #[test]
    fn test_ignores_dynamic_imports() {
        assert!(imports_of(r#"const mod = await import("./lazy");"#).is_empty());
    }

    #[test]
    fn test_multiple_statements_in_order() {
        let source = r#"
import { A } from "./a";
import B from "./b";
"#;
        let names: Vec<_> = imports_of(source).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["A", "B"]);
    }
}
