//! Per-file analysis results and the usage map derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A value import: the imported name and the module specifier it came from.
///
/// File-scoped; the importing file is tracked by whoever holds the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportSymbol {
    /// Name exported by the target module (`A` in `import { A as B }`).
    pub name: String,
    /// The module specifier exactly as written.
    pub specifier: String,
}

impl ImportSymbol {
    /// Creates a new import symbol.
    #[must_use]
    pub fn new(name: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
        }
    }
}

/// Exported surface of a module.
///
/// Name lists are sorted and free of duplicates.
///
/// # Examples
///
/// ```
/// use gc_core::ExportSummary;
///
/// let summary = ExportSummary::new(
///     vec!["b".to_owned(), "a".to_owned(), "a".to_owned()],
///     vec!["Props".to_owned()],
///     true,
/// );
/// assert_eq!(summary.value, ["a", "b"]);
/// assert!(summary.declares("Props"));
/// assert!(summary.has_default);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// Value exports (functions, classes, variables, enums, value re-exports).
    pub value: Vec<String>,
    /// Type exports (interfaces, type aliases, type-only re-exports).
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Whether the module has a default export.
    pub has_default: bool,
}

impl ExportSummary {
    /// Creates a summary, sorting and de-duplicating both name lists.
    #[must_use]
    pub fn new(mut value: Vec<String>, mut types: Vec<String>, has_default: bool) -> Self {
        value.sort_unstable();
        value.dedup();
        types.sort_unstable();
        types.dedup();
        Self {
            value,
            types,
            has_default,
        }
    }

    /// Returns `true` if `name` is exported as a value or a type.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.value.iter().any(|n| n == name) || self.types.iter().any(|n| n == name)
    }

    /// Total number of named exports.
    #[must_use]
    pub fn named_count(&self) -> usize {
        self.value.len() + self.types.len()
    }
}

/// Entry id to the sorted, distinct list of route paths that consume it.
pub type UsageMap = BTreeMap<String, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_summary_sorts_and_dedups() {
        let summary = ExportSummary::new(
            vec!["Zed".to_owned(), "Alpha".to_owned(), "Zed".to_owned()],
            vec!["T".to_owned(), "T".to_owned()],
            false,
        );
        assert_eq!(summary.value, ["Alpha", "Zed"]);
        assert_eq!(summary.types, ["T"]);
        assert_eq!(summary.named_count(), 3);
    }

    #[test]
    fn test_export_summary_wire_form() {
        let summary = ExportSummary::new(vec!["a".to_owned()], vec!["B".to_owned()], true);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["type"][0], "B");
        assert_eq!(json["hasDefault"], true);
    }

    #[test]
    fn test_declares_checks_both_namespaces() {
        let summary = ExportSummary::new(vec!["a".to_owned()], vec!["B".to_owned()], false);
        assert!(summary.declares("a"));
        assert!(summary.declares("B"));
        assert!(!summary.declares("c"));
    }
}
