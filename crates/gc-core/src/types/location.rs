//! Source positions used for render handles and syntax diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A span within a source file.
///
/// - `line` is 1-indexed
/// - `column` is 0-indexed (UTF-8 byte offset within the line)
/// - `start_byte`/`end_byte` are absolute byte offsets, end exclusive
///
/// # Examples
///
/// ```
/// use gc_core::SourceLocation;
///
/// let loc = SourceLocation::new(3, 4, 40, 58);
/// assert_eq!(loc.len(), 18);
/// assert_eq!(loc.to_string(), "3:4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: u32,

    /// Column number (0-indexed).
    pub column: u32,

    /// Byte offset of the first byte of the span.
    pub start_byte: u32,

    /// Byte offset one past the last byte of the span.
    pub end_byte: u32,
}

impl SourceLocation {
    /// Creates a new source span.
    #[inline]
    #[must_use]
    pub const fn new(line: u32, column: u32, start_byte: u32, end_byte: u32) -> Self {
        Self {
            line,
            column,
            start_byte,
            end_byte,
        }
    }

    /// Length of the span in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Returns `true` for a zero-width span.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len() {
        let loc = SourceLocation::new(1, 0, 10, 25);
        assert_eq!(loc.len(), 15);
        assert!(!loc.is_empty());
    }

    #[test]
    fn test_inverted_span_is_empty() {
        let loc = SourceLocation::new(1, 0, 25, 10);
        assert!(loc.is_empty());
    }

    #[test]
    fn test_display_is_line_colon_column() {
        assert_eq!(SourceLocation::new(12, 7, 0, 1).to_string(), "12:7");
    }
}
