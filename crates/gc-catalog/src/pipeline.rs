//! End-to-end pipelines over a [`BuildContext`].
//!
//! - [`run_usage`]: gallery modules to usage file and manifest
//! - [`run_barrel`]: component directories to a barrel file
//! - [`usage_changed`] / [`barrel_changed`]: cheap cache checks used to
//!   decide what needs regenerating
//!
//! Every pipeline runs its stages strictly in order. Nothing is written
//! until the whole output has been built and validated; the cache is
//! written last, so a failed run is retried in full next time.

use camino::Utf8PathBuf;
use gc_core::{config::absolutize, BarrelTarget, CatalogSection, PreviewRoute};
use gc_scanner::{
    build_name_lookup, correlate, discover_routes, load_gallery_modules, GalleryModule,
};
use tracing::info;

use crate::barrel::{barrel_files, generate_barrel, write_barrel};
use crate::context::BuildContext;
use crate::error::CatalogError;
use crate::manifest::{ManifestWriter, WrittenManifest};
use crate::registry::{Registry, RegistryBuilder};
use crate::routes::generate_routes;

/// Whether a pipeline did any work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The cache showed no changes; nothing was written.
    Skipped,
    /// The pipeline ran to completion.
    Completed(T),
}

impl<T> Outcome<T> {
    /// Returns `true` if the pipeline was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Summary of a catalog run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReport {
    /// Gallery modules loaded.
    pub modules: usize,
    /// Entries in the registry.
    pub entries: usize,
    /// Previews registered, entry and state.
    pub previews: usize,
    /// Preview routes generated.
    pub routes: usize,
    /// Application routes scanned for usage.
    pub app_routes: usize,
    /// What was written.
    pub manifest: WrittenManifest,
}

/// Summary of a barrel run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarrelReport {
    /// Target name.
    pub target: String,
    /// Barrel file written.
    pub output: Utf8PathBuf,
    /// Files re-exported.
    pub files: usize,
    /// Files whose analysis came from the cache.
    pub reused: usize,
}

/// Loads every gallery module and merges them into a registry.
///
/// # Errors
///
/// Returns [`CatalogError::Load`] for a module that cannot be evaluated and
/// [`CatalogError::DuplicatePreviewId`] for colliding previews.
pub fn load_registry(ctx: &BuildContext) -> Result<(Vec<GalleryModule>, Registry), CatalogError> {
    let files = ctx.gallery_files()?;
    let modules = load_gallery_modules(ctx.loader(), &files, &ctx.gallery_dir())?;
    let registry = RegistryBuilder::build_from_modules(&modules)?;
    Ok((modules, registry))
}

/// Generates preview routes for the current catalog without writing
/// anything.
///
/// # Errors
///
/// See [`load_registry`] and [`generate_routes`].
pub fn preview_routes(ctx: &BuildContext) -> Result<Vec<PreviewRoute>, CatalogError> {
    let (_, registry) = load_registry(ctx)?;
    generate_routes(&registry.payload().sections, &ctx.theme_combos())
}

/// Returns `true` if any tracked file changed since the last catalog run.
///
/// # Errors
///
/// Returns [`CatalogError::Scan`] if the project cannot be walked.
pub fn usage_changed(ctx: &BuildContext) -> Result<bool, CatalogError> {
    let store = ctx.usage_cache();
    let tracked = ctx.tracked_files()?;
    Ok(store.has_changes(&store.load(), &tracked)?)
}

/// Runs the catalog pipeline.
///
/// Unless `force` is set, the run is skipped when no tracked file changed.
///
/// # Errors
///
/// Returns the first error of any stage; see [`CatalogError`].
pub fn run_usage(ctx: &BuildContext, force: bool) -> Result<Outcome<UsageReport>, CatalogError> {
    let store = ctx.usage_cache();
    let tracked = ctx.tracked_files()?;
    if !force && !store.has_changes(&store.load(), &tracked)? {
        info!("gallery usage is up to date");
        return Ok(Outcome::Skipped);
    }

    let (modules, mut registry) = load_registry(ctx)?;
    let sections: Vec<CatalogSection> = modules
        .iter()
        .flat_map(|module| module.sections.iter().cloned())
        .collect();

    let app_routes = discover_routes(&ctx.app_dir())?;
    let usage = correlate(
        &app_routes,
        &build_name_lookup(&sections),
        ctx.analyzer(),
        ctx.resolver(),
    )?;
    registry.apply_usage(&usage);
    registry.validate()?;

    let routes = generate_routes(&registry.payload().sections, &ctx.theme_combos())?;

    let writer = ManifestWriter::new(ctx.manifest_files());
    let manifest = writer.write(&modules, registry.payload(), &routes, &usage)?;
    store.write(&tracked)?;

    let report = UsageReport {
        modules: modules.len(),
        entries: registry.payload().by_kind.len(),
        previews: registry.previews().len(),
        routes: routes.len(),
        app_routes: app_routes.len(),
        manifest,
    };
    info!(
        modules = report.modules,
        entries = report.entries,
        routes = report.routes,
        "gallery usage generated"
    );
    Ok(Outcome::Completed(report))
}

/// Returns `true` if the barrel output is missing or any of its files
/// changed since it was generated.
///
/// # Errors
///
/// Returns [`CatalogError::Scan`] if the target's directories cannot be
/// walked.
pub fn barrel_changed(ctx: &BuildContext, target: &BarrelTarget) -> Result<bool, CatalogError> {
    if !absolutize(ctx.root(), &target.output).is_file() {
        return Ok(true);
    }
    let files = barrel_files(ctx.root(), target)?;
    Ok(ctx.barrel_cache(target).has_changes(&files)?)
}

/// Runs the barrel pipeline for one target.
///
/// Unless `force` is set, the run is skipped when [`barrel_changed`]
/// reports nothing to do.
///
/// # Errors
///
/// Returns [`CatalogError::Scan`] if files cannot be listed, read, or
/// written.
pub fn run_barrel(
    ctx: &BuildContext,
    target: &BarrelTarget,
    force: bool,
) -> Result<Outcome<BarrelReport>, CatalogError> {
    if !force && !barrel_changed(ctx, target)? {
        info!(barrel = %target.name, "barrel is up to date");
        return Ok(Outcome::Skipped);
    }

    let mut cache = ctx.barrel_cache(target);
    let barrel = generate_barrel(ctx.root(), target, ctx.analyzer(), &cache)?;
    let files = barrel.files.len();
    let reused = barrel.reused;
    let output = write_barrel(barrel, &mut cache)?;

    Ok(Outcome::Completed(BarrelReport {
        target: target.name.clone(),
        output,
        files,
        reused,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use gc_core::{Config, ThemeBackground, ThemeVariant};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const BUTTON_GALLERY: &str = r#"
import { Button } from "./Button";
import { defineGallerySection } from "@/components/gallery/registry";

export default defineGallerySection({
  id: "buttons",
  entries: [
    {
      id: "button",
      name: "Button",
      kind: "primitive",
      preview: { id: "buttons:button:default", render: () => <Button>Go</Button> },
      states: [
        { id: "disabled", name: "Disabled", preview: { id: "buttons:button:disabled", render: () => <Button disabled>Go</Button> } },
      ],
    },
  ],
});
"#;

    const CARD_GALLERY: &str = r#"
import { Card } from "./Card";

export default [
  {
    id: "cards",
    entries: [
      { id: "card", name: "Card", kind: "component", preview: { id: "cards:card:default", render: () => <Card /> } },
    ],
  },
];
"#;

    fn write(root: &Utf8PathBuf, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, contents).expect("write");
    }

    fn project() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::Builder::new()
            .prefix("gc-pipeline")
            .tempdir()
            .expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");

        write(
            &root,
            "tsconfig.json",
            r#"{
  // JSONC is accepted
  "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["./src/*"] } },
}"#,
        );
        write(&root, "src/components/ui/Button.tsx", "export function Button() { return null }\n");
        write(&root, "src/components/ui/Card.tsx", "export function Card() { return null }\n");
        write(&root, "src/components/ui/Button.gallery.tsx", BUTTON_GALLERY);
        write(&root, "src/components/ui/Card.gallery.tsx", CARD_GALLERY);
        write(
            &root,
            "src/app/planner/page.tsx",
            "import { Button } from '@/components/ui/Button';\nexport default function Page() { return <Button /> }\n",
        );
        (dir, root)
    }

    fn context(root: &Utf8PathBuf) -> BuildContext {
        let mut config = Config::default();
        config.preview.variants = vec![ThemeVariant::Lg, ThemeVariant::Noir];
        config.preview.backgrounds = [0, 2].into_iter().filter_map(ThemeBackground::new).collect();
        BuildContext::new(root, config).expect("context")
    }

    #[test]
    fn test_run_usage_writes_artifacts_then_skips() {
        let (_dir, root) = project();
        let ctx = context(&root);

        let Outcome::Completed(report) = run_usage(&ctx, false).expect("run") else {
            unreachable!("first run has no cache");
        };
        assert_eq!(report.modules, 2);
        assert_eq!(report.entries, 2);
        assert_eq!(report.previews, 3);
        assert_eq!(report.routes, 3 * 4);
        assert_eq!(report.app_routes, 1);

        let files = ctx.manifest_files();
        let usage: Value =
            serde_json::from_str(&fs::read_to_string(&files.usage).expect("usage")).expect("json");
        assert_eq!(usage["button"], serde_json::json!(["/planner"]));
        assert_eq!(usage["card"], serde_json::json!([]));

        let manifest = fs::read_to_string(&files.manifest).expect("manifest");
        assert!(manifest.contains("\"../ui/Button.gallery\": Object.freeze({"));
        assert!(manifest.contains("section-buttons--entry-button--preview-disabled--state-disabled--theme-noir--bg-2"));
        crate::manifest::check_on_disk(&files.manifest).expect("valid on disk");
        crate::manifest::check_runtime_on_disk(&files.runtime).expect("runtime valid");

        assert!(!usage_changed(&ctx).expect("check"));
        assert!(run_usage(&ctx, false).expect("second run").is_skipped());
        assert!(!run_usage(&ctx, true).expect("forced run").is_skipped());
    }

    #[test]
    fn test_usage_links_related_routes() {
        let (_dir, root) = project();
        let ctx = context(&root);
        run_usage(&ctx, true).expect("run");

        let runtime: Value = serde_json::from_str(
            &fs::read_to_string(ctx.manifest_files().runtime).expect("runtime"),
        )
        .expect("json");
        let button = &runtime["galleryPayload"]["sections"][0]["entries"][0];
        assert_eq!(button["related"], serde_json::json!([{ "id": "/planner" }]));
        assert_eq!(runtime["galleryPayload"]["byKind"]["component"][0]["id"], "card");
    }

    #[test]
    fn test_duplicate_preview_aborts_before_writing() {
        let (_dir, root) = project();
        write(
            &root,
            "src/components/ui/Card.gallery.tsx",
            &CARD_GALLERY.replace("cards:card:default", "buttons:button:default"),
        );
        let ctx = context(&root);

        let err = run_usage(&ctx, true).expect_err("duplicate");
        assert!(err.to_string().contains("buttons:button:default"));
        assert!(!ctx.manifest_files().manifest.exists());
        assert!(!ctx.usage_cache().file().exists());
    }

    #[test]
    fn test_preview_routes_sorted() {
        let (_dir, root) = project();
        let ctx = context(&root);
        let routes = preview_routes(&ctx).expect("routes");
        assert_eq!(routes.len(), 12);
        assert!(routes.windows(2).all(|pair| pair[0].slug < pair[1].slug));
        assert_eq!(
            routes[0].slug,
            "section-buttons--entry-button--preview-default--theme-lg"
        );
    }

    #[test]
    fn test_run_barrel_then_skip() {
        let (_dir, root) = project();
        let ctx = context(&root);
        let target = ctx.barrel("ui").expect("target").clone();

        assert!(barrel_changed(&ctx, &target).expect("check"));
        let Outcome::Completed(report) = run_barrel(&ctx, &target, false).expect("run") else {
            unreachable!("no barrel yet");
        };
        assert_eq!(report.files, 4);
        assert_eq!(report.reused, 0);

        let barrel = fs::read_to_string(&report.output).expect("barrel");
        assert!(barrel.contains("export { Button } from \"./Button\";"));
        assert!(barrel.contains("export { default as ButtonGallery } from \"./Button.gallery\";"));

        assert!(!barrel_changed(&ctx, &target).expect("check"));
        assert!(run_barrel(&ctx, &target, false).expect("skip").is_skipped());

        fs::remove_file(&report.output).expect("remove");
        assert!(barrel_changed(&ctx, &target).expect("check"));
    }
}
