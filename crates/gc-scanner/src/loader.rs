//! Loading gallery modules into catalog sections.
//!
//! A gallery module's default export is a section, or an array of sections,
//! built from literals and local constants. [`StaticModuleLoader`] parses
//! the module, evaluates the default export without executing anything and
//! decodes the result into [`CatalogSection`]s. Render functions survive as
//! [`RenderHandle`]s pointing at their source span.
//!
//! Decoding is strict about the fields the catalog relies on and ignores
//! everything else. Every shape error names the offending field as a path
//! from the default export, for example `default[0].entries[2].preview.id`.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use gc_core::{
    Axis, AxisKind, AxisValue, CatalogEntry, CatalogSection, EntryKind, Preview, PropMeta,
    RelatedSurface, RenderHandle, SectionId, StateDefinition, UsageNote, UsageNoteKind,
};
use gc_ts_parser::{
    collect_diagnostics, evaluate_default_export, ObjectValue, ScriptKind, StaticValue, TsParser,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::LoadError;
use crate::walker::to_slash;

/// Turns a module path into the sections it exports.
///
/// Implementations must be pure: loading the same unchanged file twice
/// yields equal sections.
pub trait ModuleLoader: Send + Sync {
    /// Loads the sections exported by the module at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] naming the module if it cannot be read,
    /// evaluated or decoded.
    fn load(&self, path: &Utf8Path) -> Result<Arc<[CatalogSection]>, LoadError>;
}

/// Loader backed by static evaluation, caching results per absolute path.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use gc_scanner::{ModuleLoader, StaticModuleLoader};
///
/// let loader = StaticModuleLoader::new(&["defineGallerySection".to_owned()]);
/// let sections = loader.load(Utf8Path::new("/repo/src/components/ui/Button.gallery.tsx"))?;
/// println!("{} sections", sections.len());
/// # Ok::<(), gc_scanner::LoadError>(())
/// ```
#[derive(Debug, Default)]
pub struct StaticModuleLoader {
    identity_calls: Vec<String>,
    cache: Mutex<FxHashMap<Utf8PathBuf, Arc<[CatalogSection]>>>,
}

impl StaticModuleLoader {
    /// Creates a loader treating calls to `identity_calls` as their first
    /// argument.
    #[must_use]
    pub fn new(identity_calls: &[String]) -> Self {
        Self {
            identity_calls: identity_calls.to_vec(),
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Number of cached modules.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    /// Drops every cached module.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    fn load_uncached(&self, path: &Utf8Path) -> Result<Vec<CatalogSection>, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_owned(),
            source,
        })?;

        let parse_error = |source| LoadError::Parse {
            path: path.to_owned(),
            source,
        };
        let mut parser = TsParser::for_kind(ScriptKind::from_path(path)).map_err(parse_error)?;
        let tree = parser.parse(&source).map_err(parse_error)?;

        if let Some(first) = collect_diagnostics(&tree, &source).first() {
            return Err(LoadError::Syntax {
                path: path.to_owned(),
                diagnostic: first.to_string(),
            });
        }

        let value = evaluate_default_export(&tree, &source, path, &self.identity_calls).map_err(
            |source| LoadError::Eval {
                path: path.to_owned(),
                source,
            },
        )?;

        Decoder { file: path }.sections(&value)
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load(&self, path: &Utf8Path) -> Result<Arc<[CatalogSection]>, LoadError> {
        if let Some(hit) = self.cache.lock().get(path) {
            return Ok(Arc::clone(hit));
        }

        // Evaluate outside the lock; a racing load of the same file produces
        // an equal value
        let sections: Arc<[CatalogSection]> = self.load_uncached(path)?.into();
        debug!(
            %path,
            sections = sections.len(),
            entries = sections.iter().map(|s| s.entries.len()).sum::<usize>(),
            "loaded gallery module"
        );

        self.cache
            .lock()
            .insert(path.to_owned(), Arc::clone(&sections));
        Ok(sections)
    }
}

/// A loaded gallery module and what the manifest needs to lazy-load it.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryModule {
    /// Absolute module path.
    pub file: Utf8PathBuf,
    /// Import path relative to the gallery directory, without extension.
    pub import_path: String,
    /// Sections exported by the module.
    pub sections: Arc<[CatalogSection]>,
    /// Every preview id the module defines, entry previews before their
    /// state previews.
    pub preview_ids: Vec<String>,
}

impl GalleryModule {
    /// Loads `file` through `loader`.
    ///
    /// # Errors
    ///
    /// Propagates the loader's [`LoadError`].
    pub fn load(
        loader: &dyn ModuleLoader,
        file: &Utf8Path,
        gallery_dir: &Utf8Path,
    ) -> Result<Self, LoadError> {
        let sections = loader.load(file)?;
        let preview_ids = sections
            .iter()
            .flat_map(CatalogSection::preview_ids)
            .map(str::to_owned)
            .collect();
        Ok(Self {
            file: file.to_owned(),
            import_path: format_import_path(file, gallery_dir),
            sections,
            preview_ids,
        })
    }
}

/// Loads every module in `files`, in order.
///
/// # Errors
///
/// Returns the first [`LoadError`]; there is no partial result.
pub fn load_gallery_modules(
    loader: &dyn ModuleLoader,
    files: &[Utf8PathBuf],
    gallery_dir: &Utf8Path,
) -> Result<Vec<GalleryModule>, LoadError> {
    files
        .iter()
        .map(|file| GalleryModule::load(loader, file, gallery_dir))
        .collect()
}

/// The import path of `file` as seen from `gallery_dir`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gc_scanner::format_import_path;
///
/// let gallery = Utf8Path::new("/repo/src/components/gallery");
/// assert_eq!(
///     format_import_path(Utf8Path::new("/repo/src/components/ui/Button.gallery.tsx"), gallery),
///     "../ui/Button.gallery",
/// );
/// assert_eq!(
///     format_import_path(Utf8Path::new("/repo/src/components/gallery/sections/misc.ts"), gallery),
///     "./sections/misc",
/// );
/// ```
#[must_use]
pub fn format_import_path(file: &Utf8Path, gallery_dir: &Utf8Path) -> String {
    let relative = relative_path(gallery_dir, file).with_extension("");
    let slashed = to_slash(&relative);
    if slashed.starts_with('.') {
        slashed
    } else {
        format!("./{slashed}")
    }
}

/// Lexical relative path from directory `from` to `to`.
fn relative_path(from: &Utf8Path, to: &Utf8Path) -> Utf8PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = Utf8PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_str());
    }
    relative
}

// =============================================================================
// Decoding
// =============================================================================

static UNDEFINED: StaticValue = StaticValue::Undefined;

/// A property of `object`, reading a missing key as `undefined`.
fn field<'v>(object: &'v ObjectValue, key: &str) -> &'v StaticValue {
    object.get(key).unwrap_or(&UNDEFINED)
}

/// Decodes an evaluated default export, tracking the field path for errors.
struct Decoder<'a> {
    file: &'a Utf8Path,
}

impl Decoder<'_> {
    fn sections(&self, value: &StaticValue) -> Result<Vec<CatalogSection>, LoadError> {
        match value {
            StaticValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.section(item, &format!("default[{i}]")))
                .collect(),
            other => Ok(vec![self.section(other, "default")?]),
        }
    }

    fn section(&self, value: &StaticValue, at: &str) -> Result<CatalogSection, LoadError> {
        let object = self.object(value, at)?;
        let raw_id = self.required_str(object, "id", at)?;
        let id = SectionId::parse(&raw_id).ok_or_else(|| LoadError::UnknownSection {
            path: self.file.to_owned(),
            field: format!("{at}.id"),
            id: raw_id,
        })?;
        let entries = self.required_list(object, "entries", at, |v, at| self.entry(v, at))?;
        Ok(CatalogSection { id, entries })
    }

    fn entry(&self, value: &StaticValue, at: &str) -> Result<CatalogEntry, LoadError> {
        let object = self.object(value, at)?;
        let raw_kind = self.required_str(object, "kind", at)?;
        let kind = EntryKind::parse(&raw_kind).ok_or_else(|| {
            self.error(
                &format!("{at}.kind"),
                format!("must be one of primitive, component, complex, token; found '{raw_kind}'"),
            )
        })?;

        Ok(CatalogEntry {
            id: self.required_str(object, "id", at)?,
            name: self.required_str(object, "name", at)?,
            kind,
            description: self.optional_str(object, "description", at)?,
            tags: self.optional_list(object, "tags", at, |v, at| self.string(v, at))?,
            props: self.optional_list(object, "props", at, |v, at| self.prop(v, at))?,
            axes: self.optional_list(object, "axes", at, |v, at| self.axis(v, at))?,
            usage: self.optional_list(object, "usage", at, |v, at| self.usage_note(v, at))?,
            related: self.optional_list(object, "related", at, |v, at| self.related(v, at))?,
            preview: self.preview(field(object, "preview"), &format!("{at}.preview"))?,
            code: self.optional_str(object, "code", at)?,
            states: self.optional_list(object, "states", at, |v, at| self.state(v, at))?,
        })
    }

    fn prop(&self, value: &StaticValue, at: &str) -> Result<PropMeta, LoadError> {
        let object = self.object(value, at)?;
        Ok(PropMeta {
            name: self.required_str(object, "name", at)?,
            type_name: self.required_str(object, "type", at)?,
            required: self.optional_bool(object, "required", at)?,
            default_value: self.optional_str(object, "defaultValue", at)?,
            description: self.optional_str(object, "description", at)?,
        })
    }

    fn axis(&self, value: &StaticValue, at: &str) -> Result<Axis, LoadError> {
        let object = self.object(value, at)?;
        let raw_kind = self.required_str(object, "type", at)?;
        let kind = match raw_kind.as_str() {
            "variant" => AxisKind::Variant,
            "state" => AxisKind::State,
            _ => {
                return Err(self.error(
                    &format!("{at}.type"),
                    format!("must be 'variant' or 'state', found '{raw_kind}'"),
                ));
            }
        };
        Ok(Axis {
            id: self.required_str(object, "id", at)?,
            label: self.required_str(object, "label", at)?,
            kind,
            values: self.required_list(object, "values", at, |v, at| self.axis_value(v, at))?,
            description: self.optional_str(object, "description", at)?,
        })
    }

    /// Axis values are `{ value, description? }`; a bare string is accepted
    /// as shorthand.
    fn axis_value(&self, value: &StaticValue, at: &str) -> Result<AxisValue, LoadError> {
        if let StaticValue::String(value) = value {
            return Ok(AxisValue {
                value: value.clone(),
                description: None,
            });
        }
        let object = self.object(value, at)?;
        Ok(AxisValue {
            value: self.required_str(object, "value", at)?,
            description: self.optional_str(object, "description", at)?,
        })
    }

    fn usage_note(&self, value: &StaticValue, at: &str) -> Result<UsageNote, LoadError> {
        let object = self.object(value, at)?;
        let raw_kind = self.required_str(object, "kind", at)?;
        let kind = match raw_kind.as_str() {
            "do" => UsageNoteKind::Do,
            "dont" => UsageNoteKind::Dont,
            _ => {
                return Err(self.error(
                    &format!("{at}.kind"),
                    format!("must be 'do' or 'dont', found '{raw_kind}'"),
                ));
            }
        };
        Ok(UsageNote {
            title: self.required_str(object, "title", at)?,
            description: self.required_str(object, "description", at)?,
            kind,
        })
    }

    fn related(&self, value: &StaticValue, at: &str) -> Result<RelatedSurface, LoadError> {
        let object = self.object(value, at)?;
        Ok(RelatedSurface {
            id: self.required_str(object, "id", at)?,
            description: self.optional_str(object, "description", at)?,
        })
    }

    fn state(&self, value: &StaticValue, at: &str) -> Result<StateDefinition, LoadError> {
        let object = self.object(value, at)?;
        Ok(StateDefinition {
            id: self.required_str(object, "id", at)?,
            name: self.required_str(object, "name", at)?,
            description: self.optional_str(object, "description", at)?,
            code: self.optional_str(object, "code", at)?,
            preview: self.preview(field(object, "preview"), &format!("{at}.preview"))?,
        })
    }

    fn preview(&self, value: &StaticValue, at: &str) -> Result<Preview, LoadError> {
        let object = self.object(value, at)?;
        let id = self.required_str(object, "id", at)?;
        if id.trim().is_empty() {
            return Err(self.error(&format!("{at}.id"), "must not be empty"));
        }
        let render = match field(object, "render") {
            StaticValue::Function(handle) | StaticValue::Element(handle) => handle.clone(),
            other => {
                return Err(self.error(
                    &format!("{at}.render"),
                    format!("must be a function, found {}", other.type_name()),
                ));
            }
        };
        Ok(Preview { id, render })
    }

    // -------------------------------------------------------------------------
    // Field helpers
    // -------------------------------------------------------------------------

    fn error(&self, field: &str, message: impl Into<String>) -> LoadError {
        LoadError::shape(self.file, field, message)
    }

    fn object<'v>(&self, value: &'v StaticValue, at: &str) -> Result<&'v ObjectValue, LoadError> {
        value.as_object().ok_or_else(|| {
            self.error(at, format!("must be an object, found {}", value.type_name()))
        })
    }

    fn string(&self, value: &StaticValue, at: &str) -> Result<String, LoadError> {
        value.as_str().map(str::to_owned).ok_or_else(|| {
            self.error(at, format!("must be a string, found {}", value.type_name()))
        })
    }

    fn required_str(&self, object: &ObjectValue, key: &str, at: &str) -> Result<String, LoadError> {
        let path = format!("{at}.{key}");
        match field(object, key) {
            StaticValue::Undefined => Err(self.error(&path, "is required")),
            value => self.string(value, &path),
        }
    }

    fn optional_str(
        &self,
        object: &ObjectValue,
        key: &str,
        at: &str,
    ) -> Result<Option<String>, LoadError> {
        match field(object, key) {
            value if value.is_nullish() => Ok(None),
            value => self.string(value, &format!("{at}.{key}")).map(Some),
        }
    }

    fn optional_bool(
        &self,
        object: &ObjectValue,
        key: &str,
        at: &str,
    ) -> Result<Option<bool>, LoadError> {
        match field(object, key) {
            StaticValue::Bool(flag) => Ok(Some(*flag)),
            value if value.is_nullish() => Ok(None),
            value => Err(self.error(
                &format!("{at}.{key}"),
                format!("must be a boolean, found {}", value.type_name()),
            )),
        }
    }

    fn required_list<T>(
        &self,
        object: &ObjectValue,
        key: &str,
        at: &str,
        decode: impl Fn(&StaticValue, &str) -> Result<T, LoadError>,
    ) -> Result<Vec<T>, LoadError> {
        let path = format!("{at}.{key}");
        match field(object, key) {
            StaticValue::Undefined => Err(self.error(&path, "is required")),
            value => self.list(value, &path, decode),
        }
    }

    fn optional_list<T>(
        &self,
        object: &ObjectValue,
        key: &str,
        at: &str,
        decode: impl Fn(&StaticValue, &str) -> Result<T, LoadError>,
    ) -> Result<Option<Vec<T>>, LoadError> {
        match field(object, key) {
            value if value.is_nullish() => Ok(None),
            value => self.list(value, &format!("{at}.{key}"), decode).map(Some),
        }
    }

    fn list<T>(
        &self,
        value: &StaticValue,
        at: &str,
        decode: impl Fn(&StaticValue, &str) -> Result<T, LoadError>,
    ) -> Result<Vec<T>, LoadError> {
        let items = value.as_array().ok_or_else(|| {
            self.error(at, format!("must be an array, found {}", value.type_name()))
        })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| decode(item, &format!("{at}[{i}]")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use pretty_assertions::assert_eq;

    const BADGE_GALLERY: &str = r#"
import { Badge } from "./Badge";
import { defineGallerySection, createGalleryPreview } from "@/components/gallery/registry";

const TONES = ["neutral", "accent", "danger"] as const;

export default defineGallerySection({
  id: "feedback",
  entries: [
    {
      id: "badge",
      name: "Badge",
      kind: "primitive",
      description: "Compact status label.",
      tags: ["status", "label"],
      props: [
        { name: "tone", type: "'neutral' | 'accent' | 'danger'", defaultValue: "'neutral'" },
        { name: "children", type: "ReactNode", required: true },
      ],
      axes: [
        {
          id: "tone",
          label: "Tone",
          type: "variant",
          values: TONES.map((tone) => ({ value: tone })),
        },
      ],
      usage: [{ title: "Keep it short", description: "One or two words.", kind: "do" }],
      related: [{ id: "chip", description: "Interactive sibling" }],
      preview: createGalleryPreview({
        id: "feedback:badge:overview",
        render: () => <Badge>New</Badge>,
      }),
      states: TONES.map((tone) => ({
        id: `tone-${tone}`,
        name: `Tone ${tone}`,
        preview: { id: `feedback:badge:${tone}`, render: () => <Badge tone={tone}>New</Badge> },
      })),
    },
  ],
});
"#;

    fn loader() -> StaticModuleLoader {
        StaticModuleLoader::new(&[
            "defineGallerySection".to_owned(),
            "createGalleryPreview".to_owned(),
            "Object.freeze".to_owned(),
        ])
    }

    fn module(contents: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::Builder::new()
            .prefix("gc-loader")
            .tempdir()
            .expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8");
        let path = root.join("Badge.gallery.tsx");
        fs::write(&path, contents).expect("write");
        (dir, path)
    }

    #[test]
    fn test_load_section_with_states_and_axes() {
        let (_dir, path) = module(BADGE_GALLERY);
        let sections = loader().load(&path).expect("load");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, SectionId::Feedback);
        let entry = &sections[0].entries[0];
        assert_eq!(entry.id, "badge");
        assert_eq!(entry.kind, EntryKind::Primitive);
        assert_eq!(entry.tags.as_deref(), Some(&["status".to_owned(), "label".to_owned()][..]));

        let props = entry.props.as_ref().expect("props");
        assert_eq!(props[0].default_value.as_deref(), Some("'neutral'"));
        assert_eq!(props[1].required, Some(true));

        let axis = &entry.axes.as_ref().expect("axes")[0];
        assert_eq!(axis.kind, AxisKind::Variant);
        let values: Vec<_> = axis.values.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, ["neutral", "accent", "danger"]);

        assert_eq!(entry.usage.as_ref().expect("usage")[0].kind, UsageNoteKind::Do);
        assert_eq!(entry.related.as_ref().expect("related")[0].id, "chip");
        assert_eq!(entry.preview.id, "feedback:badge:overview");
        assert!(entry.preview.render.source.contains("<Badge>New</Badge>"));

        let states = entry.states.as_ref().expect("states");
        assert_eq!(states.len(), 3);
        assert_eq!(states[2].id, "tone-danger");
        assert_eq!(states[2].preview.id, "feedback:badge:danger");
    }

    #[test]
    fn test_gallery_module_collects_preview_ids() {
        let (dir, path) = module(BADGE_GALLERY);
        let gallery_dir = Utf8Path::from_path(dir.path()).expect("utf-8").join("gallery");
        let module = GalleryModule::load(&loader(), &path, &gallery_dir).expect("load");

        assert_eq!(module.import_path, "../Badge.gallery");
        assert_eq!(
            module.preview_ids,
            [
                "feedback:badge:overview",
                "feedback:badge:neutral",
                "feedback:badge:accent",
                "feedback:badge:danger",
            ]
        );
    }

    #[test]
    fn test_array_default_export() {
        let (_dir, path) = module(
            r#"
export default [
  { id: "buttons", entries: [] },
  { id: "misc", entries: [{ id: "x", name: "X", kind: "token", preview: { id: "misc:x", render: () => null } }] },
];
"#,
        );
        let sections = loader().load(&path).expect("load");
        let ids: Vec<_> = sections.iter().map(|s| s.id).collect();
        assert_eq!(ids, [SectionId::Buttons, SectionId::Misc]);
        assert_eq!(sections[1].entries[0].kind, EntryKind::Token);
    }

    #[test]
    fn test_cache_returns_shared_sections() {
        let (_dir, path) = module(BADGE_GALLERY);
        let loader = loader();
        let first = loader.load(&path).expect("load");
        let second = loader.load(&path).expect("load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached(), 1);

        loader.clear();
        assert_eq!(loader.cached(), 0);
    }

    #[test]
    fn test_shape_error_names_field_path() {
        let (_dir, path) = module(
            r#"export default [{ id: "cards", entries: [
  { id: "a", name: "A", kind: "component", preview: { id: "cards:a", render: () => null } },
  { id: "b", name: "B", kind: "component", preview: { id: 7, render: () => null } },
] }];"#,
        );
        let err = loader().load(&path).expect_err("bad preview id");
        assert_eq!(err.field(), Some("default[0].entries[1].preview.id"));
        assert!(err.to_string().contains("must be a string, found number"));
    }

    #[test]
    fn test_missing_preview_and_bad_render() {
        let (_dir, path) = module(
            r#"export default { id: "cards", entries: [{ id: "a", name: "A", kind: "component" }] };"#,
        );
        let err = loader().load(&path).expect_err("missing preview");
        assert_eq!(err.field(), Some("default.entries[0].preview"));

        let (_dir, path) = module(
            r#"export default { id: "cards", entries: [{ id: "a", name: "A", kind: "component", preview: { id: "cards:a", render: "nope" } }] };"#,
        );
        let err = loader().load(&path).expect_err("string render");
        assert_eq!(err.field(), Some("default.entries[0].preview.render"));
    }

    #[test]
    fn test_missing_required_fields_name_their_path() {
        let (_dir, path) = module(r#"export default { id: "cards" };"#);
        let err = loader().load(&path).expect_err("missing entries");
        assert_eq!(err.field(), Some("default.entries"));
        assert!(err.to_string().contains("is required"));

        let (_dir, path) = module(
            r#"export default { id: "cards", entries: [{ id: "a", kind: "component", preview: { id: "cards:a", render: () => null } }] };"#,
        );
        let err = loader().load(&path).expect_err("missing name");
        assert_eq!(err.field(), Some("default.entries[0].name"));
        assert!(err.to_string().contains("is required"));

        let (_dir, path) = module(r#"export default { id: "cards", entries: 3 };"#);
        let err = loader().load(&path).expect_err("entries not a list");
        assert_eq!(err.field(), Some("default.entries"));
    }

    #[test]
    fn test_empty_preview_id_rejected() {
        let (_dir, path) = module(
            r#"export default { id: "cards", entries: [{ id: "a", name: "A", kind: "component", preview: { id: "  ", render: () => null } }] };"#,
        );
        let err = loader().load(&path).expect_err("empty id");
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_unknown_section_and_kind() {
        let (_dir, path) = module(r#"export default { id: "widgets", entries: [] };"#);
        let err = loader().load(&path).expect_err("unknown section");
        assert!(matches!(err, LoadError::UnknownSection { ref id, .. } if id == "widgets"));

        let (_dir, path) = module(
            r#"export default { id: "misc", entries: [{ id: "a", name: "A", kind: "widget", preview: { id: "a", render: () => null } }] };"#,
        );
        let err = loader().load(&path).expect_err("bad kind");
        assert_eq!(err.field(), Some("default.entries[0].kind"));
    }

    #[test]
    fn test_syntax_and_eval_errors() {
        let (_dir, path) = module("export default { id: \"misc\", entries: [ };");
        let err = loader().load(&path).expect_err("syntax");
        assert!(matches!(err, LoadError::Syntax { .. }));

        let (_dir, path) = module("import { SECTION } from './shared';\nexport default SECTION;");
        let err = loader().load(&path).expect_err("imported value");
        assert!(matches!(err, LoadError::Eval { .. }));

        let missing = Utf8PathBuf::from("/definitely/not/here.gallery.tsx");
        let err = loader().load(&missing).expect_err("missing file");
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_format_import_path() {
        let gallery = Utf8Path::new("/repo/src/components/gallery");
        assert_eq!(
            format_import_path(Utf8Path::new("/repo/src/components/gallery/Misc.gallery.tsx"), gallery),
            "./Misc.gallery"
        );
        assert_eq!(
            format_import_path(Utf8Path::new("/repo/src/components/planner/Week.gallery.ts"), gallery),
            "../planner/Week.gallery"
        );
        assert_eq!(
            format_import_path(Utf8Path::new("/repo/src/features/a/B.gallery.tsx"), gallery),
            "../../features/a/B.gallery"
        );
    }
}
