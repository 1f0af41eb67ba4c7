//! Loading module-resolution settings from a `tsconfig`.
//!
//! tsconfig files are JSONC: comments and trailing commas are allowed, so
//! they are read with `json5`. Only `extends`, `compilerOptions.baseUrl` and
//! `compilerOptions.paths` are used.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use gc_core::ConfigError;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use tracing::debug;

use crate::resolver::normalize_path;

/// `extends` may name one config or, since TypeScript 5.0, several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsconfig {
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

/// One `paths` entry: a pattern with at most one `*` and its targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    /// Text before the `*` (the whole pattern if there is none).
    pub prefix: String,
    /// Text after the `*`; `None` for exact patterns.
    pub suffix: Option<String>,
    /// Substitution targets, tried in order.
    pub targets: Vec<String>,
}

impl PathMapping {
    /// Parses a `paths` key.
    ///
    /// Returns `None` for patterns with more than one `*`, which TypeScript
    /// rejects.
    #[must_use]
    pub fn new(pattern: &str, targets: Vec<String>) -> Option<Self> {
        match pattern.split_once('*') {
            Some((prefix, suffix)) if !suffix.contains('*') => Some(Self {
                prefix: prefix.to_owned(),
                suffix: Some(suffix.to_owned()),
                targets,
            }),
            Some(_) => None,
            None => Some(Self {
                prefix: pattern.to_owned(),
                suffix: None,
                targets,
            }),
        }
    }

    /// Returns the text matched by `*`, or `""` for an exact match.
    #[must_use]
    pub fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match &self.suffix {
            None => (specifier == self.prefix).then_some(""),
            Some(suffix) => {
                let rest = specifier.strip_prefix(self.prefix.as_str())?;
                if rest.len() < suffix.len() {
                    return None;
                }
                rest.strip_suffix(suffix.as_str())
            }
        }
    }

    /// Targets with `*` replaced by `captured`.
    pub fn substitute<'a>(&'a self, captured: &'a str) -> impl Iterator<Item = String> + 'a {
        self.targets
            .iter()
            .map(move |target| target.replacen('*', captured, 1))
    }
}

/// Module-resolution settings after following `extends`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerPaths {
    /// Absolute `baseUrl`, if any config in the chain sets one.
    pub base_url: Option<Utf8PathBuf>,
    /// `paths` mappings from the nearest config that declares them.
    pub paths: Vec<PathMapping>,
    /// Directory `paths` targets are relative to: `baseUrl` when set,
    /// otherwise the directory of the config declaring `paths`.
    pub paths_base: Option<Utf8PathBuf>,
}

/// Reads `path` and every config it extends.
///
/// Settings in the extending config override those it inherits.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] if a config in the chain does not
/// exist, [`ConfigError::Read`] if it cannot be read, and
/// [`ConfigError::Tsconfig`] if it cannot be parsed or the chain loops.
pub fn load_compiler_paths(path: &Utf8Path) -> Result<CompilerPaths, ConfigError> {
    let mut visiting = FxHashSet::default();
    load_recursive(&normalize_path(path), &mut visiting)
}

fn load_recursive(
    path: &Utf8Path,
    visiting: &mut FxHashSet<Utf8PathBuf>,
) -> Result<CompilerPaths, ConfigError> {
    if !visiting.insert(path.to_owned()) {
        return Err(ConfigError::Tsconfig {
            path: path.to_owned(),
            reason: "circular `extends` chain".to_owned(),
        });
    }
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_owned()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    let raw: RawTsconfig = json5::from_str(&contents).map_err(|e| ConfigError::Tsconfig {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;

    let dir = path.parent().unwrap_or(Utf8Path::new("")).to_owned();

    let mut merged = CompilerPaths::default();
    let parents = match raw.extends {
        Some(Extends::One(parent)) => vec![parent],
        Some(Extends::Many(parents)) => parents,
        None => Vec::new(),
    };
    for parent in parents {
        let Some(parent_path) = extends_path(&dir, &parent) else {
            debug!(%path, extends = %parent, "skipping package `extends`");
            continue;
        };
        let inherited = load_recursive(&parent_path, visiting)?;
        if inherited.base_url.is_some() {
            merged.base_url = inherited.base_url;
        }
        if !inherited.paths.is_empty() {
            merged.paths = inherited.paths;
            merged.paths_base = inherited.paths_base;
        }
    }

    let options = raw.compiler_options;
    if let Some(base_url) = options.base_url {
        let base_url = normalize_path(&dir.join(base_url));
        // An inherited `paths` table is re-anchored at the new baseUrl
        if merged.paths_base.is_some() {
            merged.paths_base = Some(base_url.clone());
        }
        merged.base_url = Some(base_url);
    }
    if let Some(paths) = options.paths {
        merged.paths = paths
            .into_iter()
            .filter_map(|(pattern, targets)| {
                let mapping = PathMapping::new(&pattern, targets);
                if mapping.is_none() {
                    debug!(%path, %pattern, "ignoring `paths` pattern with several `*`");
                }
                mapping
            })
            .collect();
        merged.paths_base = Some(merged.base_url.clone().unwrap_or_else(|| dir.clone()));
    }

    visiting.remove(path);
    Ok(merged)
}

/// Resolves a relative or absolute `extends` value.
fn extends_path(dir: &Utf8Path, value: &str) -> Option<Utf8PathBuf> {
    let candidate = Utf8Path::new(value);
    if !(candidate.is_absolute() || value.starts_with("./") || value.starts_with("../")) {
        return None;
    }
    let resolved = normalize_path(&dir.join(candidate));
    if resolved.extension() != Some("json") && !resolved.is_file() {
        return Some(Utf8PathBuf::from(format!("{resolved}.json")));
    }
    Some(resolved)
}
