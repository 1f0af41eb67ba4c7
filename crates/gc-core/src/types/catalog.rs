//! The catalog data model.
//!
//! Gallery modules author [`CatalogSection`]s made of [`CatalogEntry`]s. Every
//! entry (and each of its [`StateDefinition`]s) owns exactly one [`Preview`],
//! whose render function is captured as an opaque [`RenderHandle`].
//!
//! Render handles never reach the manifest. The `Serializable*` mirror types
//! carry the same metadata with previews reduced to their id, and are the only
//! representation that is ever written to disk.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::location::SourceLocation;

// =============================================================================
// Closed enums
// =============================================================================

/// Identifier of a gallery section.
///
/// The set is closed; a gallery module declaring any other section id is
/// rejected when it is loaded.
///
/// # Examples
///
/// ```
/// use gc_core::SectionId;
///
/// assert_eq!(SectionId::parse("page-header"), Some(SectionId::PageHeader));
/// assert_eq!(SectionId::PageHeader.label(), "Page Header");
/// assert_eq!(SectionId::parse("unknown"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionId {
    /// Buttons and button-like controls.
    Buttons,
    /// Form inputs.
    Inputs,
    /// Prompt composition surfaces.
    Prompts,
    /// Planner widgets.
    Planner,
    /// Cards.
    Cards,
    /// Page headers.
    PageHeader,
    /// Layout primitives.
    Layout,
    /// Feedback (toasts, banners, spinners).
    Feedback,
    /// Toggles and switches.
    Toggles,
    /// League surfaces.
    League,
    /// Everything else.
    Misc,
}

impl SectionId {
    /// All section ids in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Buttons,
        Self::Inputs,
        Self::Prompts,
        Self::Planner,
        Self::Cards,
        Self::PageHeader,
        Self::Layout,
        Self::Feedback,
        Self::Toggles,
        Self::League,
        Self::Misc,
    ];

    /// The wire form of the id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buttons => "buttons",
            Self::Inputs => "inputs",
            Self::Prompts => "prompts",
            Self::Planner => "planner",
            Self::Cards => "cards",
            Self::PageHeader => "page-header",
            Self::Layout => "layout",
            Self::Feedback => "feedback",
            Self::Toggles => "toggles",
            Self::League => "league",
            Self::Misc => "misc",
        }
    }

    /// Parses the wire form of a section id.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == value)
    }

    /// Human-readable label: each hyphen-separated word capitalized.
    #[must_use]
    pub fn label(self) -> String {
        self.as_str()
            .split('-')
            .map(|part| {
                let mut chars = part.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect::<String>()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a catalog entry, used to partition the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Low-level building block.
    Primitive,
    /// Composed component.
    Component,
    /// Feature-sized composite.
    Complex,
    /// Design token showcase.
    Token,
}

impl EntryKind {
    /// All kinds in `byKind` order.
    pub const ALL: [Self; 4] = [Self::Primitive, Self::Component, Self::Complex, Self::Token];

    /// The wire form of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Component => "component",
            Self::Complex => "complex",
            Self::Token => "token",
        }
    }

    /// Parses the wire form of a kind.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Kind of an axis of variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Visual variant (tone, size, emphasis).
    Variant,
    /// Interaction state (hover, disabled, loading).
    State,
}

/// Whether a usage note recommends or discourages a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageNoteKind {
    /// Recommended usage.
    Do,
    /// Discouraged usage.
    Dont,
}

// =============================================================================
// Entry metadata
// =============================================================================

/// Documentation for a single component prop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropMeta {
    /// Prop name.
    pub name: String,
    /// Prop type as written in source.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the prop is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Default value as written in source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One enumerated value of an [`Axis`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisValue {
    /// The value.
    pub value: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named dimension of variation with ordered values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Axis kind.
    #[serde(rename = "type")]
    pub kind: AxisKind,
    /// Ordered values.
    pub values: Vec<AxisValue>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A do/don't usage note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageNote {
    /// Note title.
    pub title: String,
    /// Note body.
    pub description: String,
    /// Recommendation polarity.
    pub kind: UsageNoteKind,
}

/// A surface (usually an application route) related to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedSurface {
    /// Surface id. Route paths are used for surfaces found by usage analysis.
    pub id: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// Authored model (carries render handles)
// =============================================================================

/// Opaque reference to a preview's render function.
///
/// The render function is never executed; the handle records where it was
/// authored so diagnostics can point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderHandle {
    /// File the function was authored in.
    pub file: Utf8PathBuf,
    /// Span of the function expression.
    pub location: SourceLocation,
    /// Source text of the function expression.
    pub source: Arc<str>,
}

impl RenderHandle {
    /// Creates a handle for a function expression.
    #[must_use]
    pub fn new(file: impl Into<Utf8PathBuf>, location: SourceLocation, source: &str) -> Self {
        Self {
            file: file.into(),
            location,
            source: Arc::from(source),
        }
    }
}

impl fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.location)
    }
}

/// A renderable, uniquely identified demo instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Globally unique preview id.
    pub id: String,
    /// The render function.
    pub render: RenderHandle,
}

/// A named sub-variant of an entry with its own preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDefinition {
    /// State id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Example code.
    pub code: Option<String>,
    /// The state's preview.
    pub preview: Preview,
}

/// One demoable component or unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Stable entry id.
    pub id: String,
    /// Display name, matched against imported symbol names by usage analysis.
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Free-form description.
    pub description: Option<String>,
    /// Search tags.
    pub tags: Option<Vec<String>>,
    /// Prop documentation.
    pub props: Option<Vec<PropMeta>>,
    /// Axes of variation.
    pub axes: Option<Vec<Axis>>,
    /// Usage notes.
    pub usage: Option<Vec<UsageNote>>,
    /// Related surfaces.
    pub related: Option<Vec<RelatedSurface>>,
    /// The default preview.
    pub preview: Preview,
    /// Example code.
    pub code: Option<String>,
    /// State sub-entries.
    pub states: Option<Vec<StateDefinition>>,
}

impl CatalogEntry {
    /// Iterates the entry preview followed by each state preview.
    pub fn previews(&self) -> impl Iterator<Item = &Preview> {
        std::iter::once(&self.preview).chain(
            self.states
                .iter()
                .flatten()
                .map(|state| &state.preview),
        )
    }

    /// Converts to the render-free representation.
    #[must_use]
    pub fn to_serializable(&self) -> SerializableEntry {
        SerializableEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            description: self.description.clone(),
            tags: self.tags.clone(),
            props: self.props.clone(),
            axes: self.axes.clone(),
            usage: self.usage.clone(),
            related: self.related.clone(),
            code: self.code.clone(),
            preview: SerializablePreview::from(&self.preview),
            states: self.states.as_ref().map(|states| {
                states.iter().map(SerializableState::from).collect()
            }),
        }
    }
}

/// A section as authored by one gallery module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSection {
    /// Section id.
    pub id: SectionId,
    /// Entries in authored order.
    pub entries: Vec<CatalogEntry>,
}

impl CatalogSection {
    /// Iterates every preview id in the section, entry previews before their
    /// state previews.
    pub fn preview_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(CatalogEntry::previews)
            .map(|preview| preview.id.as_str())
    }
}

// =============================================================================
// Serializable mirror
// =============================================================================

/// A preview reduced to its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializablePreview {
    /// Preview id.
    pub id: String,
}

impl From<&Preview> for SerializablePreview {
    fn from(preview: &Preview) -> Self {
        Self {
            id: preview.id.clone(),
        }
    }
}

/// A state without its render function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableState {
    /// State id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// The state's preview id.
    pub preview: SerializablePreview,
}

impl From<&StateDefinition> for SerializableState {
    fn from(state: &StateDefinition) -> Self {
        Self {
            id: state.id.clone(),
            name: state.name.clone(),
            description: state.description.clone(),
            code: state.code.clone(),
            preview: SerializablePreview::from(&state.preview),
        }
    }
}

/// An entry without render functions; the manifest representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableEntry {
    /// Stable entry id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Search tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Prop documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<PropMeta>>,
    /// Axes of variation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<Vec<Axis>>,
    /// Usage notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Vec<UsageNote>>,
    /// Related surfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<Vec<RelatedSurface>>,
    /// Example code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// The default preview id.
    pub preview: SerializablePreview,
    /// States without render functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<SerializableState>>,
}

/// A merged section in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableSection {
    /// Section id.
    pub id: SectionId,
    /// Entries in scan order.
    pub entries: Vec<SerializableEntry>,
}

/// Entries partitioned by [`EntryKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByKind {
    /// Primitive entries.
    pub primitive: Vec<SerializableEntry>,
    /// Component entries.
    pub component: Vec<SerializableEntry>,
    /// Complex entries.
    pub complex: Vec<SerializableEntry>,
    /// Token entries.
    pub token: Vec<SerializableEntry>,
}

impl ByKind {
    /// Appends an entry to the bucket for its kind.
    pub fn push(&mut self, entry: SerializableEntry) {
        self.bucket_mut(entry.kind).push(entry);
    }

    /// Entries of the given kind.
    #[must_use]
    pub fn get(&self, kind: EntryKind) -> &[SerializableEntry] {
        match kind {
            EntryKind::Primitive => &self.primitive,
            EntryKind::Component => &self.component,
            EntryKind::Complex => &self.complex,
            EntryKind::Token => &self.token,
        }
    }

    /// Total entries across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        EntryKind::ALL.iter().map(|kind| self.get(*kind).len()).sum()
    }

    /// Returns `true` if no kind has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_mut(&mut self, kind: EntryKind) -> &mut Vec<SerializableEntry> {
        match kind {
            EntryKind::Primitive => &mut self.primitive,
            EntryKind::Component => &mut self.component,
            EntryKind::Complex => &mut self.complex,
            EntryKind::Token => &mut self.token,
        }
    }
}

/// The serializable registry written into the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryPayload {
    /// Merged sections in first-seen order.
    pub sections: Vec<SerializableSection>,
    /// Entries partitioned by kind.
    pub by_kind: ByKind,
}

impl RegistryPayload {
    /// Iterates every entry across all sections in order.
    pub fn entries(&self) -> impl Iterator<Item = &SerializableEntry> {
        self.sections.iter().flat_map(|section| section.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn handle() -> RenderHandle {
        RenderHandle::new("button.gallery.tsx", SourceLocation::default(), "() => null")
    }

    fn preview(id: &str) -> Preview {
        Preview {
            id: id.to_owned(),
            render: handle(),
        }
    }

    fn full_entry() -> CatalogEntry {
        CatalogEntry {
            id: "button".to_owned(),
            name: "Button".to_owned(),
            kind: EntryKind::Primitive,
            description: Some("Primary action".to_owned()),
            tags: Some(vec!["action".to_owned()]),
            props: Some(vec![PropMeta {
                name: "tone".to_owned(),
                type_name: "\"primary\" | \"accent\"".to_owned(),
                required: Some(false),
                default_value: Some("\"primary\"".to_owned()),
                description: None,
            }]),
            axes: Some(vec![Axis {
                id: "tone".to_owned(),
                label: "Tone".to_owned(),
                kind: AxisKind::Variant,
                values: vec![AxisValue {
                    value: "primary".to_owned(),
                    description: None,
                }],
                description: None,
            }]),
            usage: Some(vec![UsageNote {
                title: "One primary".to_owned(),
                description: "Use one primary button per view.".to_owned(),
                kind: UsageNoteKind::Do,
            }]),
            related: Some(vec![RelatedSurface {
                id: "/planner".to_owned(),
                description: None,
            }]),
            preview: preview("buttons:button:default"),
            code: Some("<Button>Go</Button>".to_owned()),
            states: Some(vec![StateDefinition {
                id: "disabled".to_owned(),
                name: "Disabled".to_owned(),
                description: None,
                code: None,
                preview: preview("buttons:button:disabled"),
            }]),
        }
    }

    #[test]
    fn test_section_id_wire_form() {
        for id in SectionId::ALL {
            let json = serde_json::to_string(&id).expect("serialize");
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            assert_eq!(SectionId::parse(id.as_str()), Some(id));
        }
    }

    #[test]
    fn test_section_label() {
        assert_eq!(SectionId::Buttons.label(), "Buttons");
        assert_eq!(SectionId::PageHeader.label(), "Page Header");
    }

    #[test]
    fn test_entry_previews_order() {
        let entry = full_entry();
        let ids: Vec<_> = entry.previews().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["buttons:button:default", "buttons:button:disabled"]);
    }

    #[test]
    fn test_serializable_round_trip_preserves_metadata() {
        let entry = full_entry();
        let serializable = entry.to_serializable();

        let json = serde_json::to_string(&serializable).expect("serialize");
        let parsed: SerializableEntry = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(parsed, serializable);
        assert_eq!(parsed.id, entry.id);
        assert_eq!(parsed.name, entry.name);
        assert_eq!(parsed.kind, entry.kind);
        assert_eq!(parsed.description, entry.description);
        assert_eq!(parsed.tags, entry.tags);
        assert_eq!(parsed.axes, entry.axes);
        assert_eq!(parsed.related, entry.related);
        assert_eq!(parsed.code, entry.code);
        let states = parsed.states.expect("states");
        assert_eq!(states[0].id, "disabled");
        assert_eq!(states[0].preview.id, "buttons:button:disabled");
    }

    #[test]
    fn test_serializable_entry_carries_no_render() {
        let json = serde_json::to_value(full_entry().to_serializable()).expect("serialize");
        assert_eq!(json["preview"], serde_json::json!({ "id": "buttons:button:default" }));
        assert!(!json.to_string().contains("render"));
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let mut entry = full_entry();
        entry.description = None;
        entry.states = None;
        let json = serde_json::to_value(entry.to_serializable()).expect("serialize");
        let object = json.as_object().expect("object");
        assert!(!object.contains_key("description"));
        assert!(!object.contains_key("states"));
        assert_eq!(json["props"][0]["defaultValue"], "\"primary\"");
        assert_eq!(json["props"][0]["type"], "\"primary\" | \"accent\"");
    }

    #[test]
    fn test_by_kind_partitions() {
        let mut by_kind = ByKind::default();
        by_kind.push(full_entry().to_serializable());
        let mut token = full_entry().to_serializable();
        token.kind = EntryKind::Token;
        by_kind.push(token);

        assert_eq!(by_kind.get(EntryKind::Primitive).len(), 1);
        assert_eq!(by_kind.get(EntryKind::Token).len(), 1);
        assert!(by_kind.get(EntryKind::Complex).is_empty());
        assert_eq!(by_kind.len(), 2);
    }

    #[test]
    fn test_payload_serializes_by_kind_camel_case() {
        let payload = RegistryPayload::default();
        let json = serde_json::to_value(&payload).expect("serialize");
        assert!(json.get("byKind").is_some());
        assert_eq!(json["byKind"]["token"], serde_json::json!([]));
    }
}
