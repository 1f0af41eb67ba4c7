//! URL-safe slug normalization.

/// Normalizes an identifier into a slug.
///
/// The value is trimmed and lower-cased; every run of characters outside
/// `[a-z0-9]` (whitespace, `_` and `-` included) becomes a single hyphen;
/// leading and trailing hyphens are removed. The result may be empty.
///
/// Normalization is idempotent.
///
/// # Examples
///
/// ```
/// use gc_catalog::normalize_slug;
///
/// assert_eq!(normalize_slug("  Week Picker "), "week-picker");
/// assert_eq!(normalize_slug("planner:week-picker:overview"), "planner-week-picker-overview");
/// assert_eq!(normalize_slug("__a__b--"), "a-b");
/// assert_eq!(normalize_slug("!!!"), "");
/// ```
#[must_use]
pub fn normalize_slug(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Normalizes the first candidate that yields a non-empty slug.
pub(crate) fn first_slug<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .map(normalize_slug)
        .find(|slug| !slug.is_empty())
}
