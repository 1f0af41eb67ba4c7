//! Preview route generation.
//!
//! Every entry preview and every state preview is addressable under each
//! configured theme combination. A route's slug is assembled from
//! normalized segments:
//!
//! ```text
//! section-{section}--entry-{entry}--preview-{preview}[--state-{state}]--theme-{variant}[--bg-{n}]
//! ```
//!
//! The background segment is omitted for the default background (index 0).
//! Slugs must address content, so a repeated slug aborts generation instead
//! of being silently de-duplicated.

use gc_core::{
    PreviewRoute, SectionId, SerializableEntry, SerializableSection, SerializableState,
    ThemeCombo,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::CatalogError;
use crate::slug::{first_slug, normalize_slug};

/// Generates every preview route, sorted by slug.
///
/// Sections are expected in payload order: indices used by the positional
/// fallbacks (`section-{i}`, `component-{j}`, ...) are 1-based positions in
/// `sections`.
///
/// # Errors
///
/// Returns [`CatalogError::DuplicateSlug`] naming the first slug generated
/// twice.
///
/// # Examples
///
/// ```
/// use gc_catalog::generate_routes;
/// use gc_core::{ThemeBackground, ThemeCombo, ThemeVariant};
///
/// let combos = ThemeCombo::product(&[ThemeVariant::Lg], &[ThemeBackground::DEFAULT]);
/// let routes = generate_routes(&[], &combos)?;
/// assert!(routes.is_empty());
/// # Ok::<(), gc_catalog::CatalogError>(())
/// ```
pub fn generate_routes(
    sections: &[SerializableSection],
    combos: &[ThemeCombo],
) -> Result<Vec<PreviewRoute>, CatalogError> {
    let mut generator = RouteGenerator {
        combos,
        seen: FxHashSet::default(),
        routes: Vec::new(),
    };

    for (i, section) in sections.iter().enumerate() {
        let section_slug = first_slug([section.id.as_str()])
            .unwrap_or_else(|| format!("section-{}", i + 1));

        for (j, entry) in section.entries.iter().enumerate() {
            generator.entry(section.id, &section_slug, entry, i, j)?;
        }
    }

    let mut routes = generator.routes;
    routes.sort_unstable_by(|a, b| a.slug.cmp(&b.slug));
    debug!(routes = routes.len(), combos = combos.len(), "generated preview routes");
    Ok(routes)
}

/// Accumulates routes while enforcing slug uniqueness.
struct RouteGenerator<'a> {
    combos: &'a [ThemeCombo],
    seen: FxHashSet<String>,
    routes: Vec<PreviewRoute>,
}

/// Normalized segments shared by every combo of one preview.
struct Segments<'s> {
    section: &'s str,
    entry: &'s str,
    preview: String,
    state: Option<String>,
}

impl RouteGenerator<'_> {
    fn entry(
        &mut self,
        section_id: SectionId,
        section_slug: &str,
        entry: &SerializableEntry,
        i: usize,
        j: usize,
    ) -> Result<(), CatalogError> {
        let positional = format!("{}-{}", section_id.as_str(), j + 1);
        let entry_slug = first_slug([entry.id.as_str(), entry.name.as_str(), &positional])
            .unwrap_or_else(|| format!("component-{}", j + 1));

        let preview_fallback = format!("{entry_slug}-preview");
        let preview_slug = first_slug([
            local_preview_id(&entry.preview.id, section_id, &entry.id),
            &preview_fallback,
        ])
        .unwrap_or_else(|| format!("preview-{}-{}", i + 1, j + 1));

        let segments = Segments {
            section: section_slug,
            entry: &entry_slug,
            preview: preview_slug,
            state: None,
        };
        self.push_all(&segments, section_id, entry, &entry.preview.id, None)?;

        for (k, state) in entry.states.iter().flatten().enumerate() {
            let positional = format!("{entry_slug}-state-{}", k + 1);
            let state_slug = first_slug([state.id.as_str(), state.name.as_str(), &positional])
                .unwrap_or_else(|| format!("state-{}", k + 1));

            let preview_fallback = format!("{entry_slug}-{state_slug}-preview");
            let preview_slug = first_slug([
                local_preview_id(&state.preview.id, section_id, &entry.id),
                &preview_fallback,
            ])
            .unwrap_or_else(|| format!("preview-{}-{}-{}", i + 1, j + 1, k + 1));

            let segments = Segments {
                section: section_slug,
                entry: &entry_slug,
                preview: preview_slug,
                state: Some(state_slug),
            };
            self.push_all(&segments, section_id, entry, &state.preview.id, Some(state))?;
        }
        Ok(())
    }

    fn push_all(
        &mut self,
        segments: &Segments<'_>,
        section_id: SectionId,
        entry: &SerializableEntry,
        preview_id: &str,
        state: Option<&SerializableState>,
    ) -> Result<(), CatalogError> {
        for combo in self.combos {
            let slug = assemble(segments, combo);
            if !self.seen.insert(slug.clone()) {
                return Err(CatalogError::DuplicateSlug(slug));
            }
            self.routes.push(PreviewRoute {
                slug,
                preview_id: preview_id.to_owned(),
                entry_id: entry.id.clone(),
                entry_name: entry.name.clone(),
                section_id,
                state_id: state.map(|s| s.id.clone()),
                state_name: state.map(|s| s.name.clone()),
                theme_variant: combo.variant,
                theme_background: combo.background,
            });
        }
        Ok(())
    }
}

fn assemble(segments: &Segments<'_>, combo: &ThemeCombo) -> String {
    let mut slug = format!(
        "section-{}--entry-{}--preview-{}",
        segments.section, segments.entry, segments.preview
    );
    if let Some(state) = &segments.state {
        slug.push_str("--state-");
        slug.push_str(state);
    }
    slug.push_str("--theme-");
    slug.push_str(combo.variant.as_str());
    if !combo.background.is_default() {
        slug.push_str("--bg-");
        slug.push_str(&combo.background.index().to_string());
    }
    slug
}

/// Strips the `{section}:{entry}:` namespace that preview ids conventionally
/// carry, so the preview segment does not repeat the section and entry.
///
/// Ids without that exact prefix, or with nothing after it, are returned
/// unchanged.
fn local_preview_id<'a>(preview_id: &'a str, section_id: SectionId, entry_id: &str) -> &'a str {
    preview_id
        .strip_prefix(section_id.as_str())
        .and_then(|rest| rest.strip_prefix(':'))
        .and_then(|rest| rest.strip_prefix(entry_id))
        .and_then(|rest| rest.strip_prefix(':'))
        .filter(|local| !normalize_slug(local).is_empty())
        .unwrap_or(preview_id)
}
