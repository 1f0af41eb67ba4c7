//! Cross-referencing catalog entries with the routes that import them.
//!
//! A route is a directory under the app directory containing a `page.ts` or
//! `page.tsx`. Every TypeScript file below a route directory counts toward
//! that route, including files of nested routes. Imports are matched to
//! entries by the imported *name*, after checking the specifier resolves to
//! a file inside the project.
//!
//! A name maps to every entry registered under it, so two unrelated
//! components that share a display name are both credited.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use gc_core::{CatalogSection, UsageMap};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::analyzer::{AnalyzedFile, FileAnalyzer};
use crate::error::ScanError;
use crate::resolver::ModuleResolver;
use crate::walker::{to_slash, SourceWalker};

/// Entry display name to every entry id registered under it.
pub type NameLookup = FxHashMap<String, Vec<String>>;

/// An application route and the directory that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDir {
    /// Absolute directory containing the page file.
    pub dir: Utf8PathBuf,
    /// Route path, e.g. `/planner/settings`.
    pub route: String,
}

/// Finds every route under `app_dir`, sorted by route path.
///
/// # Errors
///
/// Returns a [`ScanError`] if the directory cannot be walked.
pub fn discover_routes(app_dir: &Utf8Path) -> Result<Vec<RouteDir>, ScanError> {
    let pages = SourceWalker::new(app_dir)?
        .with_patterns(&["**/page.{ts,tsx}"])?
        .collect_paths()?;

    let mut routes: Vec<RouteDir> = pages
        .iter()
        .filter_map(|page| page.parent())
        .map(|dir| RouteDir {
            dir: dir.to_owned(),
            route: format_route(dir.strip_prefix(app_dir).unwrap_or(Utf8Path::new(""))),
        })
        .collect();

    routes.sort_by(|a, b| a.route.cmp(&b.route).then_with(|| a.dir.cmp(&b.dir)));
    routes.dedup_by(|a, b| a.dir == b.dir);
    debug!(routes = routes.len(), "discovered routes");
    Ok(routes)
}

/// Formats an app-relative directory as a route path.
///
/// Route groups (`(marketing)`) are dropped.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gc_scanner::format_route;
///
/// assert_eq!(format_route(Utf8Path::new("")), "/");
/// assert_eq!(format_route(Utf8Path::new("(app)/planner/settings")), "/planner/settings");
/// assert_eq!(format_route(Utf8Path::new("(marketing)")), "/");
/// ```
#[must_use]
pub fn format_route(relative: &Utf8Path) -> String {
    let slashed = to_slash(relative);
    let kept: Vec<&str> = slashed
        .split('/')
        .filter(|segment| !segment.is_empty() && !is_route_group(segment))
        .collect();
    if kept.is_empty() {
        "/".to_owned()
    } else {
        format!("/{}", kept.join("/"))
    }
}

fn is_route_group(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('(') && segment.ends_with(')')
}

/// Maps each entry name to the ids of all entries with that name, in
/// registry order.
#[must_use]
pub fn build_name_lookup(sections: &[CatalogSection]) -> NameLookup {
    let mut lookup = NameLookup::default();
    for entry in sections.iter().flat_map(|section| &section.entries) {
        lookup
            .entry(entry.name.clone())
            .or_default()
            .push(entry.id.clone());
    }
    lookup
}

/// Builds the usage map: entry id to the sorted routes importing it.
///
/// Every entry id in `lookup` appears in the result, with an empty list
/// when nothing imports it.
///
/// # Errors
///
/// Returns a [`ScanError`] if a route directory cannot be walked or a file
/// cannot be read.
pub fn correlate(
    routes: &[RouteDir],
    lookup: &NameLookup,
    analyzer: &FileAnalyzer,
    resolver: &ModuleResolver,
) -> Result<UsageMap, ScanError> {
    let mut route_files: Vec<Vec<Utf8PathBuf>> = Vec::with_capacity(routes.len());
    let mut unique: BTreeSet<Utf8PathBuf> = BTreeSet::new();
    for route in routes {
        let files = SourceWalker::new(&route.dir)?
            .with_patterns(&["**/*.{ts,tsx}"])?
            .collect_paths()?;
        unique.extend(files.iter().cloned());
        route_files.push(files);
    }

    let unique: Vec<Utf8PathBuf> = unique.into_iter().collect();
    let analyzed = analyzer.analyze_files(&unique)?;
    let by_path: FxHashMap<&Utf8Path, &AnalyzedFile> = analyzed
        .iter()
        .map(|file| (file.path.as_path(), file))
        .collect();

    let stats = analyzer.stats();
    let mut usage: FxHashMap<&str, BTreeSet<&str>> = FxHashMap::default();

    for (route, files) in routes.iter().zip(&route_files) {
        let mut credited: FxHashSet<&str> = FxHashSet::default();

        for file in files.iter().filter_map(|path| by_path.get(path.as_path())) {
            for import in &file.analysis.imports {
                let Some(ids) = lookup.get(&import.name) else {
                    continue;
                };
                let local = resolver
                    .resolve(&import.specifier, &file.path)
                    .is_some_and(|target| resolver.is_project_local(&target));
                if !local {
                    stats.increment_discarded();
                    continue;
                }
                stats.increment_resolved();
                credited.extend(ids.iter().map(String::as_str));
            }
        }

        for id in credited {
            usage.entry(id).or_default().insert(route.route.as_str());
        }
    }

    let mut map = UsageMap::new();
    for id in lookup.values().flatten() {
        let routes = usage
            .get(id.as_str())
            .map(|routes| routes.iter().map(|route| (*route).to_owned()).collect())
            .unwrap_or_default();
        map.insert(id.clone(), routes);
    }

    info!(
        routes = routes.len(),
        files = unique.len(),
        used = map.values().filter(|routes| !routes.is_empty()).count(),
        "correlated usage"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use gc_core::{CatalogEntry, EntryKind, Preview, RenderHandle, SectionId, SourceLocation};
    use pretty_assertions::assert_eq;

    use crate::stats::ScanStats;
    use crate::tsconfig::{CompilerPaths, PathMapping};

    fn entry(id: &str, name: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_owned(),
            name: name.to_owned(),
            kind: EntryKind::Component,
            description: None,
            tags: None,
            props: None,
            axes: None,
            usage: None,
            related: None,
            preview: Preview {
                id: format!("{id}-preview"),
                render: RenderHandle::new("x.tsx", SourceLocation::new(1, 1, 0, 1), "()=>null"),
            },
            code: None,
            states: None,
        }
    }

    fn write(root: &Utf8Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    }

    #[test]
    fn test_format_route() {
        assert_eq!(format_route(Utf8Path::new("")), "/");
        assert_eq!(format_route(Utf8Path::new("planner")), "/planner");
        assert_eq!(format_route(Utf8Path::new("(app)/league/(tabs)/standings")), "/league/standings");
        assert_eq!(format_route(Utf8Path::new("(group)")), "/");
        assert_eq!(format_route(Utf8Path::new("[teamId]")), "/[teamId]");
    }

    #[test]
    fn test_build_name_lookup_keeps_all_ids() {
        let sections = vec![
            CatalogSection {
                id: SectionId::Buttons,
                entries: vec![entry("button", "Button"), entry("icon-button", "IconButton")],
            },
            CatalogSection {
                id: SectionId::Misc,
                entries: vec![entry("legacy-button", "Button")],
            },
        ];
        let lookup = build_name_lookup(&sections);
        assert_eq!(lookup["Button"], ["button", "legacy-button"]);
        assert_eq!(lookup["IconButton"], ["icon-button"]);
    }

    #[test]
    fn test_discover_and_correlate() {
        let dir = tempfile::Builder::new()
            .prefix("gc-usage")
            .tempdir()
            .expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8");

        write(&root, "src/components/ui/Button.tsx", "export default function Button() {}");
        write(&root, "src/components/ui/Card.tsx", "export function Card() {}");
        write(
            &root,
            "src/app/page.tsx",
            "import Button from '@/components/ui/Button';\nexport default function Page() { return <Button />; }",
        );
        write(
            &root,
            "src/app/(app)/planner/page.tsx",
            "import { Card } from '@/components/ui/Card';\nexport default function Planner() {}",
        );
        write(
            &root,
            "src/app/(app)/planner/Sidebar.tsx",
            "import Button from '../../../components/ui/Button';\nimport { Card as Panel } from 'some-package';\nexport function Sidebar() {}",
        );
        write(&root, "src/app/about/notes.ts", "export const x = 1;");

        let routes = discover_routes(&root.join("src/app")).expect("routes");
        let route_paths: Vec<_> = routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(route_paths, ["/", "/planner"]);

        let sections = vec![CatalogSection {
            id: SectionId::Buttons,
            entries: vec![
                entry("button", "Button"),
                entry("card", "Card"),
                entry("toggle", "Toggle"),
            ],
        }];
        let lookup = build_name_lookup(&sections);
        let analyzer =
            FileAnalyzer::new(Some(2), Arc::new(ScanStats::new())).expect("analyzer");
        let resolver = ModuleResolver::with_compiler_paths(
            &root,
            CompilerPaths {
                base_url: None,
                paths: vec![PathMapping::new("@/*", vec!["./src/*".to_owned()]).expect("valid")],
                paths_base: Some(root.clone()),
            },
        );

        let usage = correlate(&routes, &lookup, &analyzer, &resolver).expect("correlate");

        // The root route contains every file below it, nested routes included
        assert_eq!(usage["button"], ["/", "/planner"]);
        assert_eq!(usage["card"], ["/", "/planner"]);
        assert!(usage["toggle"].is_empty());
        assert_eq!(usage.len(), 3);

        let snap = analyzer.stats().snapshot();
        assert!(snap.discarded >= 1, "package import should be discarded");
    }
}
