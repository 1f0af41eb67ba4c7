//! Small helpers over tree-sitter nodes shared by the extractors.

use gc_core::SourceLocation;
use tree_sitter::Node;

/// Extracts the source text of a node.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    std::str::from_utf8(source.get(node.start_byte()..node.end_byte())?).ok()
}

/// Converts a node's span to a [`SourceLocation`].
///
/// Source files are far below 4GB, so positions fit in `u32`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn node_location(node: Node<'_>) -> SourceLocation {
    let start = node.start_position();
    SourceLocation::new(
        start.row as u32 + 1,
        start.column as u32,
        node.start_byte() as u32,
        node.end_byte() as u32,
    )
}

/// Returns `true` if the node has an anonymous child token of `kind`.
///
/// Used for modifier keywords the grammar does not expose as fields
/// (`type` in `import type`, `default` in `export default`).
pub(crate) fn has_token(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == kind)
}

/// Decodes a `string` node into its runtime value.
///
/// Returns `None` if the node is not a string literal.
pub(crate) fn string_value(node: Node<'_>, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut value = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let text = node_text(child, source)?;
        match child.kind() {
            "escape_sequence" => decode_escape(text, &mut value),
            _ => value.push_str(text),
        }
    }
    Some(value)
}

/// Name of an import/export specifier: identifiers verbatim, string names
/// (`export { "a-b" as c }`) decoded.
pub(crate) fn module_export_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    if node.kind() == "string" {
        string_value(node, source)
    } else {
        node_text(node, source).map(str::to_owned)
    }
}

/// Appends the character(s) an escape sequence stands for.
pub(crate) fn decode_escape(escape: &str, out: &mut String) {
    let body = escape.strip_prefix('\\').unwrap_or(escape);
    let mut chars = body.chars();
    let Some(head) = chars.next() else {
        return;
    };
    match head {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        'b' => out.push('\u{8}'),
        'f' => out.push('\u{c}'),
        'v' => out.push('\u{b}'),
        '0' if body.len() == 1 => out.push('\0'),
        // Line continuation
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => {}
        'x' => push_code_point(&body[1..], out),
        'u' => {
            let digits = body[1..].trim_start_matches('{').trim_end_matches('}');
            push_code_point(digits, out);
        }
        other => {
            out.push(other);
            out.push_str(chars.as_str());
        }
    }
}

fn push_code_point(hex: &str, out: &mut String) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => out.push(ch),
        None => out.push(char::REPLACEMENT_CHARACTER),
    }
}
