//! Configuration structures for the gallery-catalog tool.
//!
//! - [`Config`] - Root configuration, loaded from `gallery.config.json`
//! - [`PreviewConfig`] - Theme variants and backgrounds previews render under
//! - [`BarrelTarget`] - One generated re-export file
//! - [`EngineConfig`] - Minimum tool version required by the project
//!
//! Every field is optional in the file; missing fields take the defaults
//! below, which match a Next.js project with galleries under
//! `src/components`. Relative paths are resolved against the project root.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ThemeBackground, ThemeVariant};

/// Default name of the configuration file at the project root.
pub const CONFIG_FILE_NAME: &str = "gallery.config.json";

/// Theme combinations every preview is rendered under.
///
/// # Examples
///
/// ```
/// use gc_core::PreviewConfig;
///
/// let config = PreviewConfig::default();
/// assert_eq!(config.variants.len(), 7);
/// assert_eq!(config.backgrounds.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Enabled theme variants, in route generation order.
    pub variants: Vec<ThemeVariant>,
    /// Enabled background indices, in route generation order.
    pub backgrounds: Vec<ThemeBackground>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            variants: ThemeVariant::ALL.to_vec(),
            backgrounds: ThemeBackground::all().collect(),
        }
    }
}

/// A barrel file generated from one or more component directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrelTarget {
    /// Target name used by `barrel --target`.
    pub name: String,
    /// Directories whose files are re-exported.
    pub dirs: Vec<Utf8PathBuf>,
    /// Generated barrel file.
    pub output: Utf8PathBuf,
    /// Cache file name inside [`Config::cache_dir`].
    pub cache_file: String,
    /// Extra glob patterns excluded from the barrel.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl BarrelTarget {
    /// The default `ui` barrel over `src/components/ui`.
    #[must_use]
    pub fn ui() -> Self {
        Self {
            name: "ui".to_owned(),
            dirs: vec![Utf8PathBuf::from("src/components/ui")],
            output: Utf8PathBuf::from("src/components/ui/index.ts"),
            cache_file: "generate-ui-index.json".to_owned(),
            exclude: Vec::new(),
        }
    }
}

/// Tool version requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Minimum `gallery-gen` version (`major.minor.patch`) the project needs.
    pub minimum_version: Option<String>,
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use gc_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "appDir": "app" }"#)?;
/// assert_eq!(config.app_dir, "app");
/// assert_eq!(config.gallery_dir, "src/components/gallery");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Project module-resolution configuration.
    pub tsconfig: Utf8PathBuf,

    /// Application routes directory.
    pub app_dir: Utf8PathBuf,

    /// Directory receiving the generated manifest and usage file.
    pub gallery_dir: Utf8PathBuf,

    /// Files whose changes trigger the catalog pipeline.
    pub tracked_patterns: Vec<String>,

    /// Gallery modules loaded into the registry.
    pub gallery_patterns: Vec<String>,

    /// Directory holding cache files.
    pub cache_dir: Utf8PathBuf,

    /// Cache file name for the catalog pipeline.
    pub usage_cache_file: String,

    /// Maximum number of files analyzed in parallel.
    /// `None` means use all available CPU cores.
    pub max_parallel_jobs: Option<usize>,

    /// Calls treated as identity wrappers when evaluating gallery modules.
    pub identity_calls: Vec<String>,

    /// Theme combinations for preview routes.
    pub preview: PreviewConfig,

    /// Barrel files to generate.
    pub barrels: Vec<BarrelTarget>,

    /// Tool version requirements.
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tsconfig: Utf8PathBuf::from("tsconfig.json"),
            app_dir: Utf8PathBuf::from("src/app"),
            gallery_dir: Utf8PathBuf::from("src/components/gallery"),
            tracked_patterns: vec![
                "src/app/**/*.{ts,tsx}".to_owned(),
                "src/components/**/*.gallery.{ts,tsx}".to_owned(),
            ],
            gallery_patterns: vec!["src/components/**/*.gallery.{ts,tsx}".to_owned()],
            cache_dir: Utf8PathBuf::from("scripts/.cache"),
            usage_cache_file: "build-gallery-usage.json".to_owned(),
            max_parallel_jobs: None,
            identity_calls: vec![
                "defineGallerySection".to_owned(),
                "createGalleryPreview".to_owned(),
                "Object.freeze".to_owned(),
            ],
            preview: PreviewConfig::default(),
            barrels: vec![BarrelTarget::ui()],
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration for a project.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `<root>/gallery.config.json` is used when present and defaults otherwise.
    pub fn load(root: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => {
                let path = absolutize(root, path);
                if !path.is_file() {
                    return Err(ConfigError::MissingFile(path));
                }
                path
            }
            None => {
                let path = root.join(CONFIG_FILE_NAME);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel_jobs == Some(0) {
            return Err(ConfigError::invalid_option(
                "maxParallelJobs",
                "must be at least 1",
            ));
        }
        if self.preview.variants.is_empty() {
            return Err(ConfigError::invalid_option(
                "preview.variants",
                "at least one theme variant is required",
            ));
        }
        if self.preview.backgrounds.is_empty() {
            return Err(ConfigError::invalid_option(
                "preview.backgrounds",
                "at least one background is required",
            ));
        }
        for (index, target) in self.barrels.iter().enumerate() {
            if target.dirs.is_empty() {
                return Err(ConfigError::invalid_option(
                    format!("barrels[{index}].dirs"),
                    "at least one directory is required",
                ));
            }
            if self.barrels[..index].iter().any(|t| t.name == target.name) {
                return Err(ConfigError::invalid_option(
                    format!("barrels[{index}].name"),
                    format!("duplicate barrel target '{}'", target.name),
                ));
            }
        }
        Ok(())
    }

    /// Returns the barrel target with the given name.
    #[must_use]
    pub fn barrel(&self, name: &str) -> Option<&BarrelTarget> {
        self.barrels.iter().find(|target| target.name == name)
    }
}

/// Joins `path` onto `root` unless it is already absolute.
#[must_use]
pub fn absolutize(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.app_dir, "src/app");
        assert_eq!(config.tracked_patterns.len(), 2);
        assert_eq!(config.barrels[0].name, "ui");
        assert!(config.identity_calls.iter().any(|c| c == "defineGallerySection"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: Config = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"preview": {"variants": ["lg", "aurora"]}, "maxParallelJobs": 4}"#;
        let config: Config = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            config.preview.variants,
            [ThemeVariant::Lg, ThemeVariant::Aurora]
        );
        assert_eq!(config.preview.backgrounds.len(), 5);
        assert_eq!(config.max_parallel_jobs, Some(4));
        assert_eq!(config.usage_cache_file, "build-gallery-usage.json");
    }

    #[test]
    fn test_config_rejects_unknown_variant() {
        let json = r#"{"preview": {"variants": ["sepia"]}}"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_jobs() {
        let config = Config {
            max_parallel_jobs: Some(0),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_barrel_names() {
        let config = Config {
            barrels: vec![BarrelTarget::ui(), BarrelTarget::ui()],
            ..Config::default()
        };
        let err = config.validate().expect_err("duplicate names");
        assert!(err.to_string().contains("duplicate barrel target"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = std::env::temp_dir();
        let root = Utf8PathBuf::from_path_buf(dir.join("gc-core-no-config-here"))
            .expect("utf-8 temp dir");
        let config = Config::load(&root, None).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let root = Utf8PathBuf::from("/nonexistent-root");
        let err = Config::load(&root, Some(Utf8Path::new("custom.json"))).expect_err("missing");
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn test_absolutize() {
        let root = Utf8Path::new("/repo");
        assert_eq!(absolutize(root, Utf8Path::new("src/app")), "/repo/src/app");
        assert_eq!(absolutize(root, Utf8Path::new("/abs")), "/abs");
    }
}
