//! Manifest emission, validation, and output.
//!
//! The catalog is published as three files in the gallery directory:
//!
//! - `generated-manifest.ts`: a TypeScript module exporting the registry
//!   payload, the preview routes, and a lazy loader per gallery module
//! - `generated-manifest.runtime.json`: the same data as plain JSON for
//!   consumers that cannot import TypeScript
//! - `generated-manifest.g.ts`: an entrypoint re-exporting the manifest,
//!   stamped with a checksum of the manifest source
//!
//! Source is composed in memory, validated, and only then written. Every
//! write goes through [`write_atomic`], so a failed run leaves the previous
//! artifacts intact.

use camino::{Utf8Path, Utf8PathBuf};
use gc_core::{PreviewRoute, RegistryPayload, UsageMap};
use gc_scanner::{write_atomic, GalleryModule, ScanError};
use gc_ts_parser::{validate_syntax, ScriptKind};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{CatalogError, ValidationError};

/// Substrings every valid manifest module contains.
pub const REQUIRED_EXPORTS: [&str; 6] = [
    "export const galleryPayload =",
    "satisfies GalleryRegistryPayload;",
    "export const galleryPreviewRoutes =",
    "satisfies readonly GalleryPreviewRoute[];",
    "export const galleryPreviewModules = Object.freeze",
    "satisfies Record<string, GalleryPreviewModuleManifest>;",
];

const GENERATED_BY: &str = "// Auto-generated by gallery-gen usage";

// =============================================================================
// Emission
// =============================================================================

/// Composes the manifest module source.
///
/// JSON literals use two-space indentation; modules appear in the order
/// given, which is sorted file path order when they come from the loader.
///
/// # Errors
///
/// Returns [`CatalogError::Serialize`] if the payload or routes cannot be
/// serialized.
pub fn emit(
    modules: &[GalleryModule],
    payload: &RegistryPayload,
    routes: &[PreviewRoute],
) -> Result<String, CatalogError> {
    let payload_json = pretty_json("registry payload", payload)?;
    let routes_json = pretty_json("preview routes", routes)?;

    let mut lines: Vec<String> = [
        GENERATED_BY,
        "// Do not edit directly.",
        r#"import type { GalleryRegistryPayload, GallerySection, GalleryPreviewRoute } from "./registry";"#,
        "",
        "export interface GalleryModuleExport {",
        "  readonly default: GallerySection | readonly GallerySection[];",
        "}",
        "",
        "export interface GalleryPreviewModuleManifest {",
        "  readonly loader: () => Promise<GalleryModuleExport>;",
        "  readonly previewIds: readonly string[];",
        "}",
        "",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();

    lines.push(format!(
        "export const galleryPayload = {payload_json} as const satisfies GalleryRegistryPayload;"
    ));
    lines.push(String::new());
    lines.push(format!(
        "export const galleryPreviewRoutes = {routes_json} as const satisfies readonly GalleryPreviewRoute[];"
    ));
    lines.push(String::new());
    lines.push("export const galleryPreviewModules = Object.freeze({".to_owned());

    for module in modules {
        let import_path = quote(&module.import_path);
        lines.push(format!("  {import_path}: Object.freeze({{"));
        lines.push(format!("    loader: () => import({import_path}),"));
        lines.push("    previewIds: [".to_owned());
        lines.extend(module.preview_ids.iter().map(|id| format!("      {},", quote(id))));
        lines.push("    ] as const,".to_owned());
        lines.push("  }),".to_owned());
    }

    lines.push("}) satisfies Record<string, GalleryPreviewModuleManifest>;".to_owned());
    lines.push(String::new());

    let mut source = lines.join("\n");
    source.push('\n');
    Ok(source)
}

/// Checks that manifest source carries every required export and parses
/// without syntax errors.
///
/// # Errors
///
/// Returns [`CatalogError::Validation`] naming the first missing export or
/// listing every syntax diagnostic, or [`CatalogError::Parser`] if the
/// TypeScript front-end cannot be initialized.
pub fn validate(source: &str) -> Result<(), CatalogError> {
    if let Some(missing) = REQUIRED_EXPORTS
        .iter()
        .copied()
        .find(|required| !source.contains(required))
    {
        return Err(ValidationError::MissingExport(missing).into());
    }

    let diagnostics = validate_syntax(source, ScriptKind::TypeScript)?;
    if !diagnostics.is_empty() {
        return Err(ValidationError::Syntax(diagnostics).into());
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeManifest<'a> {
    gallery_payload: &'a RegistryPayload,
    gallery_preview_routes: &'a [PreviewRoute],
    gallery_preview_modules: Map<String, Value>,
}

/// The runtime JSON twin of the manifest module.
///
/// # Errors
///
/// Returns [`CatalogError::Serialize`] if serialization fails.
pub fn runtime_json(
    modules: &[GalleryModule],
    payload: &RegistryPayload,
    routes: &[PreviewRoute],
) -> Result<String, CatalogError> {
    let mut preview_modules = Map::new();
    for module in modules {
        let mut entry = Map::new();
        entry.insert(
            "previewIds".to_owned(),
            Value::from(module.preview_ids.clone()),
        );
        preview_modules.insert(module.import_path.clone(), Value::Object(entry));
    }

    let mut json = pretty_json(
        "runtime manifest",
        &RuntimeManifest {
            gallery_payload: payload,
            gallery_preview_routes: routes,
            gallery_preview_modules: preview_modules,
        },
    )?;
    json.push('\n');
    Ok(json)
}

/// The checksummed entrypoint re-exporting the manifest module.
#[must_use]
pub fn entrypoint_source(manifest_source: &str) -> String {
    let checksum_line = format!("// checksum: {}", checksum(manifest_source));
    let lines = [
        GENERATED_BY,
        checksum_line.as_str(),
        "import type { Manifest } from './manifest.schema'",
        "import {",
        "  galleryPayload,",
        "  galleryPreviewModules,",
        "  galleryPreviewRoutes,",
        "} from './generated-manifest'",
        "",
        "export const manifest = {",
        "  galleryPayload,",
        "  galleryPreviewModules,",
        "  galleryPreviewRoutes,",
        "} as const satisfies Manifest",
        "",
        "export { galleryPayload, galleryPreviewModules, galleryPreviewRoutes }",
        "",
        "export default manifest",
        "",
    ];
    let mut source = lines.join("\n");
    source.push('\n');
    source
}

/// First eight hex digits of the SHA-256 of `source`.
#[must_use]
pub fn checksum(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    hex::encode(&digest[..4])
}

/// The usage file: entry id to consuming routes, pretty JSON.
///
/// Keys follow registry entry order. Ids in `usage` that no entry claims
/// come last, sorted.
///
/// # Errors
///
/// Returns [`CatalogError::Serialize`] if serialization fails.
pub fn usage_json(payload: &RegistryPayload, usage: &UsageMap) -> Result<String, CatalogError> {
    let mut ordered = Map::new();
    for entry in payload.entries() {
        if ordered.contains_key(&entry.id) {
            continue;
        }
        let routes = usage.get(&entry.id).map(Vec::as_slice).unwrap_or_default();
        ordered.insert(entry.id.clone(), Value::from(routes.to_vec()));
    }
    for (id, routes) in usage {
        if !ordered.contains_key(id) {
            ordered.insert(id.clone(), Value::from(routes.clone()));
        }
    }

    let mut json = pretty_json("usage map", &ordered)?;
    json.push('\n');
    Ok(json)
}

fn pretty_json<T: Serialize + ?Sized>(what: &'static str, value: &T) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(value).map_err(|e| CatalogError::serialize(what, e))
}

/// A JSON string literal, which is also a valid TypeScript string literal.
fn quote(value: &str) -> String {
    Value::from(value).to_string()
}

// =============================================================================
// Output
// =============================================================================

/// Paths of the generated catalog files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFiles {
    /// The manifest module.
    pub manifest: Utf8PathBuf,
    /// The runtime JSON twin.
    pub runtime: Utf8PathBuf,
    /// The checksummed entrypoint.
    pub entrypoint: Utf8PathBuf,
    /// The usage file.
    pub usage: Utf8PathBuf,
}

impl ManifestFiles {
    /// The standard file names inside `gallery_dir`.
    #[must_use]
    pub fn in_dir(gallery_dir: &Utf8Path) -> Self {
        Self {
            manifest: gallery_dir.join("generated-manifest.ts"),
            runtime: gallery_dir.join("generated-manifest.runtime.json"),
            entrypoint: gallery_dir.join("generated-manifest.g.ts"),
            usage: gallery_dir.join("usage.json"),
        }
    }
}

/// Summary of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenManifest {
    /// Checksum stamped into the entrypoint.
    pub checksum: String,
    /// Size of the manifest module in bytes.
    pub bytes: usize,
}

/// Renders, validates, and writes the catalog files.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    files: ManifestFiles,
}

impl ManifestWriter {
    /// Creates a writer for `files`.
    #[must_use]
    pub fn new(files: ManifestFiles) -> Self {
        Self { files }
    }

    /// The files this writer produces.
    #[inline]
    #[must_use]
    pub fn files(&self) -> &ManifestFiles {
        &self.files
    }

    /// Writes the usage file, manifest module, runtime JSON, and entrypoint.
    ///
    /// Everything is rendered and the manifest validated before the first
    /// byte is written.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] if the composed manifest is
    /// invalid, or [`CatalogError::Scan`] if a write fails.
    pub fn write(
        &self,
        modules: &[GalleryModule],
        payload: &RegistryPayload,
        routes: &[PreviewRoute],
        usage: &UsageMap,
    ) -> Result<WrittenManifest, CatalogError> {
        let source = emit(modules, payload, routes)?;
        validate(&source)?;
        let runtime = runtime_json(modules, payload, routes)?;
        let usage = usage_json(payload, usage)?;
        let entrypoint = entrypoint_source(&source);
        let written = WrittenManifest {
            checksum: checksum(&source),
            bytes: source.len(),
        };

        write_atomic(&self.files.usage, &usage)?;
        write_atomic(&self.files.manifest, &source)?;
        write_atomic(&self.files.runtime, &runtime)?;
        write_atomic(&self.files.entrypoint, &entrypoint)?;

        info!(
            path = %self.files.manifest,
            checksum = %written.checksum,
            bytes = written.bytes,
            "wrote gallery manifest"
        );
        Ok(written)
    }
}

// =============================================================================
// On-disk checks
// =============================================================================

/// Verifies the manifest module on disk is present and valid.
///
/// # Errors
///
/// Returns [`CatalogError::StaleManifest`] if the file is missing, holds raw
/// JSON, or fails [`validate`].
pub fn check_on_disk(path: &Utf8Path) -> Result<(), CatalogError> {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::stale(path, "the file does not exist"));
        }
        Err(e) => return Err(ScanError::read(path, e).into()),
    };

    let trimmed = source.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Err(CatalogError::stale(
            path,
            "it contains raw JSON instead of a TypeScript module",
        ));
    }

    match validate(&source) {
        Ok(()) => {
            debug!(%path, "manifest on disk is valid");
            Ok(())
        }
        Err(CatalogError::Validation(e)) => Err(CatalogError::stale(path, e.to_string())),
        Err(e) => Err(e),
    }
}

/// Verifies the runtime JSON twin on disk has the shape consumers read.
///
/// # Errors
///
/// Returns [`CatalogError::StaleManifest`] if the file is missing, is not a
/// JSON object, or any module's `previewIds` is not a list of strings.
pub fn check_runtime_on_disk(path: &Utf8Path) -> Result<(), CatalogError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::stale(path, "the file does not exist"));
        }
        Err(e) => return Err(ScanError::read(path, e).into()),
    };

    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| CatalogError::stale(path, format!("it is not valid JSON ({e})")))?;
    let Some(object) = value.as_object() else {
        return Err(CatalogError::stale(path, "it is not a JSON object"));
    };

    for key in ["galleryPayload", "galleryPreviewRoutes"] {
        if !object.contains_key(key) {
            return Err(CatalogError::stale(path, format!("`{key}` is missing")));
        }
    }

    let Some(modules) = object.get("galleryPreviewModules").and_then(Value::as_object) else {
        return Err(CatalogError::stale(path, "`galleryPreviewModules` is not an object"));
    };
    for (import_path, module) in modules {
        let ids_are_strings = module
            .get("previewIds")
            .and_then(Value::as_array)
            .is_some_and(|ids| ids.iter().all(Value::is_string));
        if !ids_are_strings {
            return Err(CatalogError::stale(
                path,
                format!("`previewIds` of '{import_path}' is not a list of strings"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use gc_core::{
        EntryKind, SectionId, SerializableEntry, SerializablePreview, SerializableSection,
        ThemeBackground, ThemeVariant,
    };
    use pretty_assertions::assert_eq;

    fn module(import_path: &str, preview_ids: &[&str]) -> GalleryModule {
        GalleryModule {
            file: Utf8PathBuf::from(format!("/repo/src/components/gallery/{import_path}.ts")),
            import_path: import_path.to_owned(),
            sections: Arc::from(Vec::new()),
            preview_ids: preview_ids.iter().map(|id| (*id).to_owned()).collect(),
        }
    }

    fn route() -> PreviewRoute {
        PreviewRoute {
            slug: "section-misc--entry-badge--preview-default--theme-lg".to_owned(),
            preview_id: "misc:badge:default".to_owned(),
            entry_id: "badge".to_owned(),
            entry_name: "Badge".to_owned(),
            section_id: SectionId::Misc,
            state_id: None,
            state_name: None,
            theme_variant: ThemeVariant::Lg,
            theme_background: ThemeBackground::DEFAULT,
        }
    }

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::Builder::new()
            .prefix("gc-manifest")
            .tempdir()
            .expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        (dir, path)
    }

    #[test]
    fn test_emit_exact_layout() {
        let source = emit(
            &[module("./sections/misc", &["a", "b"])],
            &RegistryPayload::default(),
            &[],
        )
        .expect("emit");

        let expected = r#"// Auto-generated by gallery-gen usage
// Do not edit directly.
import type { GalleryRegistryPayload, GallerySection, GalleryPreviewRoute } from "./registry";

export interface GalleryModuleExport {
  readonly default: GallerySection | readonly GallerySection[];
}

export interface GalleryPreviewModuleManifest {
  readonly loader: () => Promise<GalleryModuleExport>;
  readonly previewIds: readonly string[];
}

export const galleryPayload = {
  "sections": [],
  "byKind": {
    "primitive": [],
    "component": [],
    "complex": [],
    "token": []
  }
} as const satisfies GalleryRegistryPayload;

export const galleryPreviewRoutes = [] as const satisfies readonly GalleryPreviewRoute[];

export const galleryPreviewModules = Object.freeze({
  "./sections/misc": Object.freeze({
    loader: () => import("./sections/misc"),
    previewIds: [
      "a",
      "b",
    ] as const,
  }),
}) satisfies Record<string, GalleryPreviewModuleManifest>;

"#;
        assert_eq!(source, expected);
    }

    #[test]
    fn test_emitted_manifest_validates() {
        let source = emit(
            &[module("../ui/Badge.gallery", &["misc:badge:default"])],
            &RegistryPayload::default(),
            &[route()],
        )
        .expect("emit");
        assert!(source.contains("\"themeVariant\": \"lg\""));
        assert!(source.contains("\"stateId\": null"));
        validate(&source).expect("valid manifest");
    }

    #[test]
    fn test_validate_reports_missing_export() {
        let source = emit(&[], &RegistryPayload::default(), &[]).expect("emit");
        let broken = source.replace("satisfies GalleryRegistryPayload;", "satisfies Nothing;");
        let err = validate(&broken).expect_err("missing export");
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::MissingExport("satisfies GalleryRegistryPayload;"))
        ));
    }

    #[test]
    fn test_validate_reports_syntax_errors() {
        let source = emit(&[], &RegistryPayload::default(), &[]).expect("emit");
        let broken = source.replace("\"sections\": [],", "\"sections\": [,,");
        let err = validate(&broken).expect_err("syntax error");
        assert!(matches!(err, CatalogError::Validation(ValidationError::Syntax(ref d)) if !d.is_empty()));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), r#""a\"b""#);
        assert_eq!(quote("./x"), r#""./x""#);
    }

    #[test]
    fn test_entrypoint_carries_checksum() {
        let source = emit(&[], &RegistryPayload::default(), &[]).expect("emit");
        let entrypoint = entrypoint_source(&source);
        let sum = checksum(&source);

        assert_eq!(sum.len(), 8);
        assert!(sum.chars().all(|c| c.is_ascii_hexdigit()));
        let lines: Vec<_> = entrypoint.lines().collect();
        assert_eq!(lines[0], GENERATED_BY);
        assert_eq!(lines[1], format!("// checksum: {sum}"));
        assert_eq!(lines.last().copied(), Some(""));
        assert!(entrypoint.ends_with("export default manifest\n\n"));
        assert_ne!(checksum("a"), checksum("b"));
    }

    #[test]
    fn test_runtime_json_shape() {
        let json = runtime_json(
            &[module("./sections/misc", &["a"])],
            &RegistryPayload::default(),
            &[route()],
        )
        .expect("runtime");
        let value: Value = serde_json::from_str(&json).expect("parse");
        let keys: Vec<_> = value.as_object().expect("object").keys().cloned().collect();
        assert_eq!(keys, ["galleryPayload", "galleryPreviewRoutes", "galleryPreviewModules"]);
        assert_eq!(
            value["galleryPreviewModules"]["./sections/misc"]["previewIds"],
            serde_json::json!(["a"])
        );
        assert!(json.ends_with("}\n"));
    }

    fn entry(id: &str) -> SerializableEntry {
        SerializableEntry {
            id: id.to_owned(),
            name: id.to_owned(),
            kind: EntryKind::Component,
            description: None,
            tags: None,
            props: None,
            axes: None,
            usage: None,
            related: None,
            code: None,
            preview: SerializablePreview {
                id: format!("{id}:default"),
            },
            states: None,
        }
    }

    #[test]
    fn test_usage_json_is_pretty_with_newline() {
        let mut usage = UsageMap::new();
        usage.insert("button".to_owned(), vec!["/".to_owned(), "/planner".to_owned()]);
        let json = usage_json(&RegistryPayload::default(), &usage).expect("usage");
        assert_eq!(json, "{\n  \"button\": [\n    \"/\",\n    \"/planner\"\n  ]\n}\n");
    }

    #[test]
    fn test_usage_json_follows_entry_order() {
        let payload = RegistryPayload {
            sections: vec![
                SerializableSection {
                    id: SectionId::Toggles,
                    entries: vec![entry("switch"), entry("checkbox")],
                },
                SerializableSection {
                    id: SectionId::Buttons,
                    entries: vec![entry("button")],
                },
            ],
            ..RegistryPayload::default()
        };
        let mut usage = UsageMap::new();
        usage.insert("button".to_owned(), vec!["/planner".to_owned()]);
        usage.insert("checkbox".to_owned(), vec![]);
        usage.insert("switch".to_owned(), vec!["/".to_owned()]);

        let json = usage_json(&payload, &usage).expect("usage");
        let parsed: Map<String, Value> = serde_json::from_str(&json).expect("json");
        let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
        assert_eq!(keys, ["switch", "checkbox", "button"]);
        assert_eq!(parsed["switch"], serde_json::json!(["/"]));
    }

    #[test]
    fn test_writer_writes_all_files_and_check_passes() {
        let (_dir, root) = temp_dir();
        let files = ManifestFiles::in_dir(&root.join("gallery"));
        let writer = ManifestWriter::new(files.clone());

        let written = writer
            .write(
                &[module("./sections/misc", &["misc:badge:default"])],
                &RegistryPayload::default(),
                &[route()],
                &UsageMap::new(),
            )
            .expect("write");

        let entrypoint = std::fs::read_to_string(&files.entrypoint).expect("entrypoint");
        assert!(entrypoint.contains(&format!("// checksum: {}", written.checksum)));
        assert_eq!(std::fs::read_to_string(&files.usage).expect("usage"), "{}\n");

        check_on_disk(&files.manifest).expect("manifest valid");
        check_runtime_on_disk(&files.runtime).expect("runtime valid");
    }

    #[test]
    fn test_check_on_disk_rejects_missing_and_raw_json() {
        let (_dir, root) = temp_dir();
        let path = root.join("generated-manifest.ts");

        let err = check_on_disk(&path).expect_err("missing");
        assert!(matches!(err, CatalogError::StaleManifest { .. }));

        std::fs::write(&path, "  {\"galleryPayload\": {}}").expect("write");
        let err = check_on_disk(&path).expect_err("raw json");
        let msg = err.to_string();
        assert!(msg.contains("raw JSON"));
        assert!(msg.contains("Run `gallery-gen usage` to regenerate"));
    }

    #[test]
    fn test_check_on_disk_rejects_invalid_module() {
        let (_dir, root) = temp_dir();
        let path = root.join("generated-manifest.ts");
        std::fs::write(&path, "export const galleryPayload = 1;\n").expect("write");

        let err = check_on_disk(&path).expect_err("invalid");
        assert!(matches!(err, CatalogError::StaleManifest { ref reason, .. } if reason.contains("missing required export")));
    }

    #[test]
    fn test_check_runtime_rejects_bad_preview_ids() {
        let (_dir, root) = temp_dir();
        let path = root.join("generated-manifest.runtime.json");
        std::fs::write(
            &path,
            r#"{"galleryPayload":{},"galleryPreviewRoutes":[],"galleryPreviewModules":{"./a":{"previewIds":[1]}}}"#,
        )
        .expect("write");

        let err = check_runtime_on_disk(&path).expect_err("bad ids");
        assert!(err.to_string().contains("'./a'"));
    }
}
