//! Registry builder: merges loaded sections into the serializable payload.
//!
//! This module provides [`RegistryBuilder`], which turns the sections of
//! every gallery module into one [`RegistryPayload`] and a side map from
//! preview id to render function.
//!
//! # Merging
//!
//! Sections are grouped by id in first-seen order. Entries of a group are
//! concatenated in the order their modules were loaded, which is sorted
//! file path order upstream. Entries are never merged by identity.
//!
//! # Usage
//!
//! ```no_run
//! use gc_catalog::RegistryBuilder;
//! # let sections: Vec<gc_core::CatalogSection> = Vec::new();
//!
//! let registry = RegistryBuilder::build(&sections)?;
//! println!("{} previews", registry.previews().len());
//! # Ok::<(), gc_catalog::CatalogError>(())
//! ```

use gc_core::{
    ByKind, CatalogEntry, CatalogSection, RegistryPayload, RelatedSurface, RenderHandle,
    SectionId, SerializableSection, UsageMap,
};
use gc_scanner::GalleryModule;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::error::CatalogError;

// =============================================================================
// Preview map
// =============================================================================

/// Preview id to render function, in registration order.
#[derive(Debug, Clone, Default)]
pub struct PreviewMap {
    entries: Vec<(String, RenderHandle)>,
    index: FxHashMap<String, usize>,
}

impl PreviewMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a preview.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicatePreviewId`] if `id` is already
    /// registered. The first definition is kept.
    pub fn insert(&mut self, id: &str, render: &RenderHandle) -> Result<(), CatalogError> {
        if let Some(&existing) = self.index.get(id) {
            return Err(CatalogError::DuplicatePreviewId {
                id: id.to_owned(),
                first: self.entries[existing].1.clone(),
                second: render.clone(),
            });
        }
        self.index.insert(id.to_owned(), self.entries.len());
        self.entries.push((id.to_owned(), render.clone()));
        Ok(())
    }

    /// Returns the render function registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RenderHandle> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    /// Returns `true` if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of registered previews.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no preview is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates previews in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RenderHandle)> {
        self.entries.iter().map(|(id, render)| (id.as_str(), render))
    }
}

// =============================================================================
// Registry
// =============================================================================

/// The merged catalog.
#[derive(Debug, Clone)]
pub struct Registry {
    payload: RegistryPayload,
    previews: PreviewMap,
}

impl Registry {
    /// The serializable payload written to the manifest.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &RegistryPayload {
        &self.payload
    }

    /// Render functions keyed by preview id.
    #[inline]
    #[must_use]
    pub fn previews(&self) -> &PreviewMap {
        &self.previews
    }

    /// Splits the registry into payload and preview map.
    #[must_use]
    pub fn into_parts(self) -> (RegistryPayload, PreviewMap) {
        (self.payload, self.previews)
    }

    /// Adds each entry's consuming routes to its `related` surfaces.
    ///
    /// Authored surfaces stay first; a route already listed is not added
    /// again. Entries without usage are left untouched.
    pub fn apply_usage(&mut self, usage: &UsageMap) {
        let mut linked = 0_usize;
        for entry in self
            .payload
            .sections
            .iter_mut()
            .flat_map(|section| section.entries.iter_mut())
        {
            let Some(routes) = usage.get(&entry.id).filter(|routes| !routes.is_empty()) else {
                continue;
            };
            let related = entry.related.get_or_insert_with(Vec::new);
            let mut seen: FxHashSet<String> =
                related.iter().map(|surface| surface.id.clone()).collect();
            for route in routes {
                if seen.insert(route.clone()) {
                    related.push(RelatedSurface {
                        id: route.clone(),
                        description: None,
                    });
                    linked += 1;
                }
            }
        }

        self.payload.by_kind = by_kind(&self.payload.sections);
        debug!(linked, "applied usage to related surfaces");
    }

    /// Re-checks constraints the types cannot express: entry ids are unique
    /// and preview ids are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Schema`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut entry_ids: FxHashSet<&str> = FxHashSet::default();

        for (i, section) in self.payload.sections.iter().enumerate() {
            for (j, entry) in section.entries.iter().enumerate() {
                let at = format!("sections[{i}].entries[{j}]");
                if !entry_ids.insert(entry.id.as_str()) {
                    return Err(CatalogError::schema(
                        format!("{at}.id"),
                        format!("duplicates entry id '{}'", entry.id),
                    ));
                }
                if entry.preview.id.trim().is_empty() {
                    return Err(CatalogError::schema(format!("{at}.preview.id"), "must not be empty"));
                }
                for (k, state) in entry.states.iter().flatten().enumerate() {
                    if state.preview.id.trim().is_empty() {
                        return Err(CatalogError::schema(
                            format!("{at}.states[{k}].preview.id"),
                            "must not be empty",
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a [`Registry`] from loaded sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryBuilder;

impl RegistryBuilder {
    /// Merges `sections` into a registry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicatePreviewId`] if two previews, entry
    /// or state, share an id.
    pub fn build(sections: &[CatalogSection]) -> Result<Registry, CatalogError> {
        let mut order: Vec<(SectionId, Vec<&CatalogEntry>)> = Vec::new();
        let mut positions: FxHashMap<SectionId, usize> = FxHashMap::default();

        for section in sections {
            let position = *positions.entry(section.id).or_insert_with(|| {
                order.push((section.id, Vec::new()));
                order.len() - 1
            });
            order[position].1.extend(section.entries.iter());
        }

        let mut previews = PreviewMap::new();
        let mut serializable = Vec::with_capacity(order.len());

        for (id, entries) in order {
            let mut out = Vec::with_capacity(entries.len());
            for entry in entries {
                for preview in entry.previews() {
                    previews.insert(&preview.id, &preview.render)?;
                }
                out.push(entry.to_serializable());
            }
            serializable.push(SerializableSection { id, entries: out });
        }

        let by_kind = by_kind(&serializable);
        info!(
            sections = serializable.len(),
            entries = by_kind.len(),
            previews = previews.len(),
            "built registry"
        );

        Ok(Registry {
            payload: RegistryPayload {
                sections: serializable,
                by_kind,
            },
            previews,
        })
    }

    /// Merges the sections of `modules`, in module order.
    ///
    /// # Errors
    ///
    /// See [`RegistryBuilder::build`].
    pub fn build_from_modules(modules: &[GalleryModule]) -> Result<Registry, CatalogError> {
        let sections: Vec<CatalogSection> = modules
            .iter()
            .flat_map(|module| module.sections.iter().cloned())
            .collect();
        Self::build(&sections)
    }
}

/// Partitions entries by kind in a single pass, keeping section order.
fn by_kind(sections: &[SerializableSection]) -> ByKind {
    let mut by_kind = ByKind::default();
    for entry in sections.iter().flat_map(|section| &section.entries) {
        by_kind.push(entry.clone());
    }
    by_kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::{EntryKind, Preview, SourceLocation, StateDefinition};
    use pretty_assertions::assert_eq;

    fn preview(id: &str) -> Preview {
        Preview {
            id: id.to_owned(),
            render: RenderHandle::new("x.gallery.tsx", SourceLocation::new(1, 1, 0, 8), "()=>null"),
        }
    }

    fn entry(id: &str, kind: EntryKind) -> CatalogEntry {
        CatalogEntry {
            id: id.to_owned(),
            name: id.to_uppercase(),
            kind,
            description: None,
            tags: None,
            props: None,
            axes: None,
            usage: None,
            related: None,
            preview: preview(&format!("{id}:overview")),
            code: None,
            states: None,
        }
    }

    fn state(id: &str, preview_id: &str) -> StateDefinition {
        StateDefinition {
            id: id.to_owned(),
            name: id.to_owned(),
            description: None,
            code: None,
            preview: preview(preview_id),
        }
    }

    #[test]
    fn test_sections_grouped_in_first_seen_order() {
        let sections = vec![
            CatalogSection {
                id: SectionId::Cards,
                entries: vec![entry("card", EntryKind::Component)],
            },
            CatalogSection {
                id: SectionId::Buttons,
                entries: vec![entry("button", EntryKind::Primitive)],
            },
            CatalogSection {
                id: SectionId::Cards,
                entries: vec![entry("hero-card", EntryKind::Complex)],
            },
        ];

        let registry = RegistryBuilder::build(&sections).expect("build");
        let payload = registry.payload();
        let ids: Vec<_> = payload.sections.iter().map(|s| s.id).collect();
        assert_eq!(ids, [SectionId::Cards, SectionId::Buttons]);

        let card_ids: Vec<_> = payload.sections[0].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(card_ids, ["card", "hero-card"]);

        assert_eq!(payload.by_kind.get(EntryKind::Component).len(), 1);
        assert_eq!(payload.by_kind.get(EntryKind::Primitive)[0].id, "button");
        assert!(payload.by_kind.get(EntryKind::Token).is_empty());
        assert_eq!(payload.by_kind.len(), 3);
    }

    #[test]
    fn test_preview_map_collects_states_in_order() {
        let mut button = entry("button", EntryKind::Primitive);
        button.states = Some(vec![state("hover", "button:hover"), state("disabled", "button:disabled")]);
        let sections = vec![CatalogSection {
            id: SectionId::Buttons,
            entries: vec![button],
        }];

        let registry = RegistryBuilder::build(&sections).expect("build");
        let ids: Vec<_> = registry.previews().iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["button:overview", "button:hover", "button:disabled"]);
        assert!(registry.previews().get("button:hover").is_some());

        let serialized = &registry.payload().sections[0].entries[0];
        assert_eq!(serialized.states.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_duplicate_preview_id_is_fatal() {
        let mut toggle = entry("toggle", EntryKind::Primitive);
        toggle.states = Some(vec![state("on", "button:overview")]);
        let sections = vec![
            CatalogSection {
                id: SectionId::Buttons,
                entries: vec![entry("button", EntryKind::Primitive)],
            },
            CatalogSection {
                id: SectionId::Toggles,
                entries: vec![toggle],
            },
        ];

        let err = RegistryBuilder::build(&sections).expect_err("duplicate");
        assert!(matches!(
            err,
            CatalogError::DuplicatePreviewId { ref id, .. } if id == "button:overview"
        ));
    }

    #[test]
    fn test_apply_usage_appends_routes_after_authored() {
        let mut button = entry("button", EntryKind::Primitive);
        button.related = Some(vec![RelatedSurface {
            id: "/planner".to_owned(),
            description: Some("Primary actions".to_owned()),
        }]);
        let sections = vec![CatalogSection {
            id: SectionId::Buttons,
            entries: vec![button, entry("chip", EntryKind::Primitive)],
        }];
        let mut registry = RegistryBuilder::build(&sections).expect("build");

        let mut usage = UsageMap::new();
        usage.insert("button".to_owned(), vec!["/".to_owned(), "/planner".to_owned()]);
        usage.insert("chip".to_owned(), Vec::new());
        registry.apply_usage(&usage);

        let entries = &registry.payload().sections[0].entries;
        let related: Vec<_> = entries[0]
            .related
            .iter()
            .flatten()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(related, ["/planner", "/"]);
        assert!(entries[1].related.is_none());

        // byKind mirrors the updated entries
        let primitive = registry.payload().by_kind.get(EntryKind::Primitive);
        assert_eq!(primitive[0].related.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_validate_rejects_duplicate_entry_ids() {
        let sections = vec![
            CatalogSection {
                id: SectionId::Buttons,
                entries: vec![entry("button", EntryKind::Primitive)],
            },
            CatalogSection {
                id: SectionId::Misc,
                entries: vec![{
                    let mut twin = entry("button", EntryKind::Primitive);
                    twin.preview = preview("misc:button");
                    twin
                }],
            },
        ];
        let registry = RegistryBuilder::build(&sections).expect("distinct previews");
        let err = registry.validate().expect_err("duplicate entry id");
        assert!(err.to_string().contains("sections[1].entries[0].id"));
    }

    #[test]
    fn test_validate_accepts_well_formed_registry() {
        let sections = vec![CatalogSection {
            id: SectionId::Layout,
            entries: vec![entry("stack", EntryKind::Primitive)],
        }];
        let registry = RegistryBuilder::build(&sections).expect("build");
        assert!(registry.validate().is_ok());
    }
}
