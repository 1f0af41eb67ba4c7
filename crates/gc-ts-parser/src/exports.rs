//! Export extraction from TypeScript syntax trees.
//!
//! Classifies top-level `export` statements into an [`ExportSummary`]:
//!
//! - `export function f` / `export class C` / `export enum E` - value
//! - `export const { a, b: [c] } = ..` - value, per bound name
//! - `export interface I` / `export type T = ..` - type
//! - `export { a, b as c }`, `export { a } from ".."` - value, or type when the
//!   clause or the element is marked `type`
//! - `export * as ns from ".."` - value (type for `export type * as`)
//! - `export default ..` - sets `has_default`
//!
//! `export * from ".."` is skipped on purpose: re-exporting an unknown
//! surface would duplicate names across barrels. `export = x` is not a
//! default export.

use gc_core::ExportSummary;
use tree_sitter::{Node, Tree};

use crate::node::{has_token, module_export_name, node_text};

/// Accumulates names for one file.
#[derive(Default)]
struct ExportCollector {
    values: Vec<String>,
    types: Vec<String>,
    has_default: bool,
}

impl ExportCollector {
    fn finish(self) -> ExportSummary {
        ExportSummary::new(self.values, self.types, self.has_default)
    }
}

/// Extracts the export surface of a parsed module.
///
/// # Examples
///
/// ```ignore
/// let tree = parser.parse(source)?;
/// let summary = extract_exports(&tree, source);
/// assert!(summary.value.contains(&"Button".to_owned()));
/// ```
pub fn extract_exports(tree: &Tree, source: &str) -> ExportSummary {
    let bytes = source.as_bytes();
    let mut collector = ExportCollector::default();
    let root = tree.root_node();
    let mut cursor = root.walk();

    for statement in root.named_children(&mut cursor) {
        if statement.kind() == "export_statement" {
            collect_statement(statement, bytes, &mut collector);
        }
    }

    collector.finish()
}

fn collect_statement(statement: Node<'_>, source: &[u8], out: &mut ExportCollector) {
    if has_token(statement, "default") {
        out.has_default = true;
        return;
    }
    // `export = x` and `export as namespace X`
    if has_token(statement, "=") || has_token(statement, "namespace") {
        return;
    }

    if let Some(declaration) = statement.child_by_field_name("declaration") {
        collect_declaration(declaration, source, out);
        return;
    }

    let type_only = has_token(statement, "type");
    let mut cursor = statement.walk();
    for child in statement.named_children(&mut cursor) {
        match child.kind() {
            "export_clause" => collect_clause(child, source, type_only, out),
            "namespace_export" => {
                let mut inner = child.walk();
                let name = child
                    .named_children(&mut inner)
                    .last()
                    .and_then(|node| module_export_name(node, source));
                if let Some(name) = name {
                    push(out, name, type_only);
                }
            }
            _ => {}
        }
    }
}

fn collect_declaration(declaration: Node<'_>, source: &[u8], out: &mut ExportCollector) {
    match declaration.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "class_declaration"
        | "abstract_class_declaration"
        | "enum_declaration" => {
            if let Some(name) = declared_name(declaration, source) {
                out.values.push(name);
            }
        }
        "interface_declaration" | "type_alias_declaration" => {
            if let Some(name) = declared_name(declaration, source) {
                out.types.push(name);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            for declarator in declaration.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(pattern) = declarator.child_by_field_name("name") {
                    collect_binding_names(pattern, source, &mut out.values);
                }
            }
        }
        // `export declare const x: T;`
        "ambient_declaration" => {
            let mut cursor = declaration.walk();
            if let Some(inner) = declaration.named_children(&mut cursor).next() {
                collect_declaration(inner, source, out);
            }
        }
        _ => {}
    }
}

fn collect_clause(clause: Node<'_>, source: &[u8], type_only: bool, out: &mut ExportCollector) {
    let mut cursor = clause.walk();
    for element in clause.named_children(&mut cursor) {
        if element.kind() != "export_specifier" {
            continue;
        }
        let exported = element
            .child_by_field_name("alias")
            .or_else(|| element.child_by_field_name("name"))
            .and_then(|node| module_export_name(node, source));
        if let Some(name) = exported {
            push(out, name, type_only || has_token(element, "type"));
        }
    }
}

/// Collects every identifier bound by a declarator name, descending through
/// object and array destructuring patterns.
fn collect_binding_names(pattern: Node<'_>, source: &[u8], out: &mut Vec<String>) {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            if let Some(name) = node_text(pattern, source) {
                out.push(name.to_owned());
            }
        }
        "pair_pattern" => {
            if let Some(value) = pattern.child_by_field_name("value") {
                collect_binding_names(value, source, out);
            }
        }
        "object_assignment_pattern" | "assignment_pattern" => {
            if let Some(left) = pattern.child_by_field_name("left") {
                collect_binding_names(left, source, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            let mut cursor = pattern.walk();
            for child in pattern.named_children(&mut cursor) {
                collect_binding_names(child, source, out);
            }
        }
        _ => {}
    }
}

fn declared_name(declaration: Node<'_>, source: &[u8]) -> Option<String> {
    declaration
        .child_by_field_name("name")
        .and_then(|node| node_text(node, source))
        .map(str::to_owned)
}

fn push(out: &mut ExportCollector, name: String, is_type: bool) {
    if is_type {
        out.types.push(name);
    } else {
        out.values.push(name);
    }
}
