//! Module specifier resolution following the project's `tsconfig`.
//!
//! [`ModuleResolver`] maps an import specifier written in one file to the
//! file it refers to, the way the TypeScript compiler would for a bundler
//! project: relative paths, `paths` aliases, `baseUrl`, then `node_modules`.
//!
//! Resolution never fails loudly. A specifier that cannot be resolved is
//! `None`, and callers drop results outside the project with
//! [`ModuleResolver::is_project_local`].

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use gc_core::ConfigError;
use serde::Deserialize;

use crate::tsconfig::{load_compiler_paths, CompilerPaths, PathMapping};

/// Extensions appended to a candidate path, in lookup order.
const EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts", ".js", ".jsx"];

/// Index files tried inside a candidate directory, in order.
const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.d.ts", "index.js", "index.jsx"];

/// `package.json` fields naming a package entry point, in priority order.
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    types: Option<String>,
    typings: Option<String>,
    main: Option<String>,
}

/// Resolves import specifiers to files.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use gc_scanner::ModuleResolver;
///
/// let root = Utf8Path::new("/repo");
/// let resolver = ModuleResolver::from_tsconfig(root, &root.join("tsconfig.json"))?;
/// let target = resolver.resolve("@/components/ui/Button", &root.join("src/app/page.tsx"));
/// assert!(target.is_some_and(|path| resolver.is_project_local(&path)));
/// # Ok::<(), gc_core::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: Utf8PathBuf,
    compiler: CompilerPaths,
}

impl ModuleResolver {
    /// Creates a resolver with no `baseUrl` or `paths`.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: normalize_path(root),
            compiler: CompilerPaths::default(),
        }
    }

    /// Creates a resolver from a tsconfig file and its `extends` chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config in the chain is missing,
    /// unreadable or malformed.
    pub fn from_tsconfig(root: &Utf8Path, tsconfig: &Utf8Path) -> Result<Self, ConfigError> {
        let compiler = load_compiler_paths(tsconfig)?;
        tracing::debug!(
            %tsconfig,
            base_url = ?compiler.base_url,
            paths = compiler.paths.len(),
            "loaded module resolution settings"
        );
        Ok(Self {
            root: normalize_path(root),
            compiler,
        })
    }

    /// Creates a resolver from already-loaded settings.
    #[must_use]
    pub fn with_compiler_paths(root: &Utf8Path, compiler: CompilerPaths) -> Self {
        Self {
            root: normalize_path(root),
            compiler,
        }
    }

    /// The project root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Resolves `specifier` as imported from `from_file`.
    ///
    /// Returns a lexically normalized absolute path, or `None` if nothing
    /// matches.
    #[must_use]
    pub fn resolve(&self, specifier: &str, from_file: &Utf8Path) -> Option<Utf8PathBuf> {
        let from_dir = from_file.parent().unwrap_or(&self.root);

        if is_relative(specifier) {
            return first_existing(&from_dir.join(specifier));
        }
        if Utf8Path::new(specifier).is_absolute() {
            return first_existing(Utf8Path::new(specifier));
        }

        if let Some(found) = self.resolve_paths(specifier) {
            return Some(found);
        }
        if let Some(found) = self
            .compiler
            .base_url
            .as_ref()
            .and_then(|base_url| first_existing(&base_url.join(specifier)))
        {
            return Some(found);
        }
        resolve_node_module(specifier, from_dir)
    }

    /// Returns `true` if `path` is inside the project and not a dependency.
    #[must_use]
    pub fn is_project_local(&self, path: &Utf8Path) -> bool {
        path.starts_with(&self.root)
            && !path
                .components()
                .any(|component| component.as_str() == "node_modules")
    }

    /// Tries the `paths` mapping that matches `specifier` best.
    ///
    /// Exact patterns beat wildcards; among wildcards the longest prefix
    /// wins.
    fn resolve_paths(&self, specifier: &str) -> Option<Utf8PathBuf> {
        let base = self.compiler.paths_base.as_deref()?;
        let (mapping, captured) = best_mapping(&self.compiler.paths, specifier)?;
        mapping
            .substitute(captured)
            .find_map(|target| first_existing(&base.join(target)))
    }
}

fn best_mapping<'m, 's>(
    mappings: &'m [PathMapping],
    specifier: &'s str,
) -> Option<(&'m PathMapping, &'s str)> {
    let mut best: Option<(&PathMapping, &str)> = None;
    for mapping in mappings {
        let Some(captured) = mapping.capture(specifier) else {
            continue;
        };
        if mapping.suffix.is_none() {
            return Some((mapping, captured));
        }
        if best.is_none_or(|(current, _)| mapping.prefix.len() > current.prefix.len()) {
            best = Some((mapping, captured));
        }
    }
    best
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Resolves a candidate: the exact file, then with each extension, then as a
/// directory with an index file.
fn first_existing(candidate: &Utf8Path) -> Option<Utf8PathBuf> {
    let candidate = normalize_path(candidate);

    if candidate.is_file() {
        return Some(candidate);
    }

    for extension in EXTENSIONS {
        let with_extension = Utf8PathBuf::from(format!("{candidate}{extension}"));
        if with_extension.is_file() {
            return Some(with_extension);
        }
    }

    // ESM-style `./button.js` written against a `button.ts` source
    if let Some(stem) = candidate
        .as_str()
        .strip_suffix(".js")
        .or_else(|| candidate.as_str().strip_suffix(".jsx"))
    {
        for extension in [".ts", ".tsx"] {
            let source = Utf8PathBuf::from(format!("{stem}{extension}"));
            if source.is_file() {
                return Some(source);
            }
        }
    }

    if candidate.is_dir() {
        return INDEX_FILES
            .iter()
            .map(|index| candidate.join(index))
            .find(|path| path.is_file());
    }

    None
}

/// Looks `specifier` up in `node_modules`, walking up from `from_dir`.
fn resolve_node_module(specifier: &str, from_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let (package, subpath) = split_package_specifier(specifier)?;

    for dir in from_dir.ancestors() {
        let package_dir = dir.join("node_modules").join(package);
        if !package_dir.is_dir() {
            continue;
        }
        if !subpath.is_empty() {
            return first_existing(&package_dir.join(subpath));
        }
        return package_entry(&package_dir)
            .and_then(|entry| first_existing(&package_dir.join(entry)))
            .or_else(|| first_existing(&package_dir));
    }
    None
}

/// Splits `@scope/name/sub/path` into (`@scope/name`, `sub/path`).
fn split_package_specifier(specifier: &str) -> Option<(&str, &str)> {
    let split_at = if specifier.starts_with('@') {
        let slash = specifier.find('/')?;
        specifier[slash + 1..]
            .find('/')
            .map(|next| slash + 1 + next)
    } else {
        specifier.find('/')
    };
    match split_at {
        Some(index) => Some((&specifier[..index], &specifier[index + 1..])),
        None => Some((specifier, "")),
    }
}

fn package_entry(package_dir: &Utf8Path) -> Option<String> {
    let contents = std::fs::read_to_string(package_dir.join("package.json")).ok()?;
    let manifest: PackageManifest = serde_json::from_str(&contents).ok()?;
    manifest.types.or(manifest.typings).or(manifest.main)
}

/// Lexically normalizes a path: removes `.` and folds `..` into its parent.
///
/// Symlinks are not followed.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gc_scanner::normalize_path;
///
/// assert_eq!(normalize_path(Utf8Path::new("/repo/src/./app/../lib/x.ts")), "/repo/src/lib/x.ts");
/// assert_eq!(normalize_path(Utf8Path::new("a/../../b")), "../b");
/// ```
#[must_use]
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Utf8Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                out.push(component.as_str());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        for (rel, contents) in [
            ("src/app/page.tsx", "export default function Page() {}"),
            ("src/app/planner/page.tsx", "export default function Page() {}"),
            ("src/components/ui/Button.tsx", "export default function Button() {}"),
            ("src/components/ui/index.ts", "export { default as Button } from './Button';"),
            ("src/lib/format.ts", "export const format = 1;"),
            ("src/lib/types.d.ts", "export type T = string;"),
            (
                "node_modules/@radix-ui/react-slot/package.json",
                r#"{ "name": "@radix-ui/react-slot", "types": "dist/index.d.ts" }"#,
            ),
            ("node_modules/@radix-ui/react-slot/dist/index.d.ts", "export {};"),
            ("node_modules/clsx/index.js", "module.exports = {};"),
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(path, contents).expect("write");
        }
        (dir, root)
    }

    fn resolver(root: &Utf8Path) -> ModuleResolver {
        ModuleResolver::with_compiler_paths(
            root,
            CompilerPaths {
                base_url: Some(root.to_owned()),
                paths: vec![
                    PathMapping::new("@/*", vec!["./src/*".to_owned()]).expect("valid"),
                    PathMapping::new("@/components/ui/*", vec!["./src/components/ui/*".to_owned()])
                        .expect("valid"),
                    PathMapping::new("@ui", vec!["./src/components/ui".to_owned()])
                        .expect("valid"),
                ],
                paths_base: Some(root.to_owned()),
            },
        )
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Utf8Path::new("/a/b/../c/./d")), "/a/c/d");
        assert_eq!(normalize_path(Utf8Path::new("/../a")), "/a");
        assert_eq!(normalize_path(Utf8Path::new("./x")), "x");
    }

    #[test]
    fn test_relative_specifier_tries_extensions() {
        let (_dir, root) = project();
        let resolver = resolver(&root);
        let from = root.join("src/app/planner/page.tsx");

        assert_eq!(
            resolver.resolve("../../lib/format", &from),
            Some(root.join("src/lib/format.ts"))
        );
        assert_eq!(
            resolver.resolve("../../lib/types", &from),
            Some(root.join("src/lib/types.d.ts"))
        );
        assert_eq!(resolver.resolve("./missing", &from), None);
    }

    #[test]
    fn test_paths_wildcard_and_index_lookup() {
        let (_dir, root) = project();
        let resolver = resolver(&root);
        let from = root.join("src/app/page.tsx");

        assert_eq!(
            resolver.resolve("@/components/ui/Button", &from),
            Some(root.join("src/components/ui/Button.tsx"))
        );
        assert_eq!(
            resolver.resolve("@/components/ui", &from),
            Some(root.join("src/components/ui/index.ts"))
        );
        assert_eq!(
            resolver.resolve("@ui", &from),
            Some(root.join("src/components/ui/index.ts"))
        );
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mappings = vec![
            PathMapping::new("@/*", vec!["a/*".to_owned()]).expect("valid"),
            PathMapping::new("@/components/*", vec!["b/*".to_owned()]).expect("valid"),
        ];
        let (mapping, captured) = best_mapping(&mappings, "@/components/Card").expect("match");
        assert_eq!(mapping.prefix, "@/components/");
        assert_eq!(captured, "Card");
    }

    #[test]
    fn test_base_url_fallback() {
        let (_dir, root) = project();
        let resolver = resolver(&root);
        assert_eq!(
            resolver.resolve("src/lib/format", &root.join("src/app/page.tsx")),
            Some(root.join("src/lib/format.ts"))
        );
    }

    #[test]
    fn test_node_modules_lookup_is_not_local() {
        let (_dir, root) = project();
        let resolver = resolver(&root);
        let from = root.join("src/app/page.tsx");

        let slot = resolver
            .resolve("@radix-ui/react-slot", &from)
            .expect("package resolves");
        assert_eq!(slot, root.join("node_modules/@radix-ui/react-slot/dist/index.d.ts"));
        assert!(!resolver.is_project_local(&slot));

        let clsx = resolver.resolve("clsx", &from).expect("index fallback");
        assert!(clsx.ends_with("clsx/index.js"));

        assert_eq!(resolver.resolve("react", &from), None);
    }

    #[test]
    fn test_is_project_local() {
        let resolver = ModuleResolver::new(Utf8Path::new("/repo"));
        assert!(resolver.is_project_local(Utf8Path::new("/repo/src/a.ts")));
        assert!(!resolver.is_project_local(Utf8Path::new("/other/src/a.ts")));
        assert!(!resolver.is_project_local(Utf8Path::new("/repo/node_modules/x/a.ts")));
    }

    #[test]
    fn test_split_package_specifier() {
        assert_eq!(split_package_specifier("react"), Some(("react", "")));
        assert_eq!(split_package_specifier("react-dom/client"), Some(("react-dom", "client")));
        assert_eq!(
            split_package_specifier("@radix-ui/react-slot"),
            Some(("@radix-ui/react-slot", ""))
        );
        assert_eq!(
            split_package_specifier("@scope/pkg/deep/path"),
            Some(("@scope/pkg", "deep/path"))
        );
        assert_eq!(split_package_specifier("@scope"), None);
    }

    #[test]
    fn test_from_tsconfig() {
        let (_dir, root) = project();
        fs::write(
            root.join("tsconfig.json"),
            r#"{ "compilerOptions": { "paths": { "@/*": ["./src/*"] } } }"#,
        )
        .expect("write");
        let resolver =
            ModuleResolver::from_tsconfig(&root, &root.join("tsconfig.json")).expect("load");
        assert_eq!(
            resolver.resolve("@/lib/format", &root.join("src/app/page.tsx")),
            Some(root.join("src/lib/format.ts"))
        );
    }
}
