//! Barrel file generation.
//!
//! A barrel re-exports the public surface of every module in one or more
//! component directories:
//!
//! ```text
//! export { default as Button } from "./Button";
//! export { buttonSizes } from "./Button";
//! export type { ButtonProps } from "./Button";
//! ```
//!
//! Files are visited with gallery modules last, then by relative path. A
//! name is exported only by the first file that claims it, so the barrel
//! never contains duplicate bindings.
//!
//! Export analysis is cached per file by modification time; only changed
//! files are parsed, in parallel on the analyzer's pool.

use camino::{Utf8Path, Utf8PathBuf};
use gc_core::{config::absolutize, BarrelCacheRecord, BarrelManifest, BarrelTarget};
use gc_scanner::{format_import_path, mtime_ms, write_atomic, BarrelCache, FileAnalyzer, SourceWalker};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::error::CatalogError;

/// Files a barrel never re-exports.
const INDEX_EXCLUDES: [&str; 2] = ["!**/index.ts", "!**/index.tsx"];

/// Result of generating one barrel.
#[derive(Debug, Clone, PartialEq)]
pub struct BarrelOutput {
    /// Absolute path the barrel is written to.
    pub output: Utf8PathBuf,
    /// The barrel source.
    pub source: String,
    /// Cache records for exactly the files that were visited.
    pub records: BarrelManifest,
    /// Visited files in emission order.
    pub files: Vec<Utf8PathBuf>,
    /// Files whose analysis came from the cache.
    pub reused: usize,
}

/// The default-export alias for a file: its stem in `PascalCase`.
///
/// Every run of characters outside `[A-Za-z0-9]` is dropped and the
/// character after it upper-cased; the first character is upper-cased too.
///
/// # Examples
///
/// ```
/// use gc_catalog::to_export_name;
///
/// assert_eq!(to_export_name("Button.gallery.tsx"), "ButtonGallery");
/// assert_eq!(to_export_name("text-input.tsx"), "TextInput");
/// assert_eq!(to_export_name("use_theme.ts"), "UseTheme");
/// ```
#[must_use]
pub fn to_export_name(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".tsx")
        .or_else(|| file_name.strip_suffix(".ts"))
        .unwrap_or(file_name);

    let mut name = String::with_capacity(stem.len());
    let mut upper_next = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next || name.is_empty() {
                name.push(c.to_ascii_uppercase());
            } else {
                name.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    name
}

/// Collects the files of a barrel target, sorted and de-duplicated.
///
/// `index.ts(x)` files, the configured excludes, and the barrel output
/// itself are skipped.
///
/// # Errors
///
/// Returns [`CatalogError::Scan`] if a directory is missing or a pattern is
/// invalid.
pub fn barrel_files(root: &Utf8Path, target: &BarrelTarget) -> Result<Vec<Utf8PathBuf>, CatalogError> {
    let output = absolutize(root, &target.output);
    let mut patterns: Vec<String> = vec!["**/*.{ts,tsx}".to_owned()];
    patterns.extend(INDEX_EXCLUDES.iter().map(|p| (*p).to_owned()));
    patterns.extend(target.exclude.iter().map(|p| format!("!{}", p.trim_start_matches('!'))));

    let mut files = Vec::new();
    for dir in &target.dirs {
        let walker = SourceWalker::new(&absolutize(root, dir))?.with_patterns(&patterns)?;
        files.extend(walker.collect_paths()?);
    }
    files.retain(|file| *file != output);
    files.sort();
    files.dedup();
    Ok(files)
}

/// Generates the barrel for `target` without writing anything.
///
/// # Errors
///
/// Returns [`CatalogError::Scan`] if files cannot be listed, stat'ed, read,
/// or parsed.
pub fn generate_barrel(
    root: &Utf8Path,
    target: &BarrelTarget,
    analyzer: &FileAnalyzer,
    cache: &BarrelCache,
) -> Result<BarrelOutput, CatalogError> {
    let output = absolutize(root, &target.output);
    let base = output.parent().unwrap_or(root);

    let mut files: Vec<(bool, String, Utf8PathBuf)> = barrel_files(root, target)?
        .into_iter()
        .map(|file| {
            let file_name = file.file_name().unwrap_or_default();
            let is_gallery = file_name.ends_with(".gallery.ts") || file_name.ends_with(".gallery.tsx");
            let sort_key = format!(
                "{}.{}",
                format_import_path(&file, base),
                file.extension().unwrap_or_default()
            );
            (is_gallery, sort_key, file)
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let files: Vec<Utf8PathBuf> = files.into_iter().map(|(_, _, file)| file).collect();

    let mut records: Vec<Option<BarrelCacheRecord>> = Vec::with_capacity(files.len());
    let mut mtimes = Vec::with_capacity(files.len());
    let mut stale = Vec::new();
    for file in &files {
        let mtime = mtime_ms(file)?;
        match cache.fresh(file, mtime) {
            Some(record) => {
                analyzer.stats().increment_cached();
                records.push(Some(record.clone()));
            }
            None => {
                stale.push(file.clone());
                records.push(None);
            }
        }
        mtimes.push(mtime);
    }
    let reused = files.len() - stale.len();

    let mut analyzed = analyzer.analyze_files(&stale)?.into_iter();
    for (index, slot) in records.iter_mut().enumerate() {
        if slot.is_some() {
            continue;
        }
        let Some(file) = analyzed.next() else {
            break;
        };
        let exports = file.analysis.exports;
        *slot = Some(BarrelCacheRecord {
            mtime_ms: mtimes[index],
            name: exports
                .has_default
                .then(|| to_export_name(file.path.file_name().unwrap_or_default())),
            value_exports: Some(exports.value),
            type_exports: Some(exports.types),
        });
    }

    let mut emitter = Emitter::default();
    let mut manifest = BarrelManifest::new();
    for (file, record) in files.iter().zip(records) {
        let Some(record) = record else {
            continue;
        };
        emitter.file(&format_import_path(file, base), &record);
        manifest.insert(cache.key(file), record);
    }

    debug!(barrel = %target.name, files = files.len(), reused, "generated barrel");
    Ok(BarrelOutput {
        output,
        source: emitter.finish(),
        records: manifest,
        files,
        reused,
    })
}

/// Writes a generated barrel and replaces the target's cache with its
/// records.
///
/// # Errors
///
/// Returns [`CatalogError::Scan`] if either write fails.
pub fn write_barrel(barrel: BarrelOutput, cache: &mut BarrelCache) -> Result<Utf8PathBuf, CatalogError> {
    write_atomic(&barrel.output, &barrel.source)?;
    cache.replace(barrel.records)?;
    info!(path = %barrel.output, files = barrel.files.len(), "wrote barrel");
    Ok(barrel.output)
}

/// Builds barrel source while tracking claimed names.
#[derive(Default)]
struct Emitter {
    lines: Vec<String>,
    aliases: FxHashSet<String>,
    values: FxHashSet<String>,
    types: FxHashSet<String>,
}

impl Emitter {
    fn file(&mut self, import_path: &str, record: &BarrelCacheRecord) {
        let values = record.value_exports.as_deref().unwrap_or_default();
        let types = record.type_exports.as_deref().unwrap_or_default();

        if let Some(alias) = &record.name {
            let shadowed = values.contains(alias) || types.contains(alias);
            if !shadowed && self.aliases.insert(alias.clone()) {
                self.lines
                    .push(format!("export {{ default as {alias} }} from \"{import_path}\";"));
            }
        }

        let fresh_values: Vec<&str> = values
            .iter()
            .filter(|name| self.values.insert((*name).clone()))
            .map(String::as_str)
            .collect();
        if !fresh_values.is_empty() {
            self.lines.push(format!(
                "export {{ {} }} from \"{import_path}\";",
                fresh_values.join(", ")
            ));
        }

        let fresh_types: Vec<&str> = types
            .iter()
            .filter(|name| !self.values.contains(*name) && self.types.insert((*name).clone()))
            .map(String::as_str)
            .collect();
        if !fresh_types.is_empty() {
            self.lines.push(format!(
                "export type {{ {} }} from \"{import_path}\";",
                fresh_types.join(", ")
            ));
        }
    }

    fn finish(self) -> String {
        let mut source = String::from("// Auto-generated by gallery-gen barrel.\n// Do not edit directly.\n");
        for line in self.lines {
            source.push_str(&line);
            source.push('\n');
        }
        source
    }
}
