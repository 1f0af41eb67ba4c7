//! Per-invocation build state.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use gc_core::{config::absolutize, BarrelTarget, Config, ThemeCombo};
use gc_scanner::{
    BarrelCache, CacheStore, FileAnalyzer, ModuleResolver, ScanStats, SourceWalker,
    StaticModuleLoader,
};
use tracing::debug;

use crate::error::CatalogError;
use crate::manifest::ManifestFiles;

/// Everything one run of the tool needs: configuration, resolver, module
/// loader, analyzer and statistics.
///
/// Nothing here is global. Two contexts never share a loader cache or
/// counters, so tests can build as many as they like.
#[derive(Debug)]
pub struct BuildContext {
    root: Utf8PathBuf,
    config: Config,
    resolver: ModuleResolver,
    loader: StaticModuleLoader,
    analyzer: FileAnalyzer,
    stats: Arc<ScanStats>,
}

impl BuildContext {
    /// Creates a context for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] if the configuration is invalid or
    /// the tsconfig cannot be read, and [`CatalogError::Scan`] if the
    /// analysis pool cannot start.
    pub fn new(root: &Utf8Path, config: Config) -> Result<Self, CatalogError> {
        config.validate()?;
        let resolver = ModuleResolver::from_tsconfig(root, &absolutize(root, &config.tsconfig))?;
        let stats = Arc::new(ScanStats::new());
        let analyzer = FileAnalyzer::new(config.max_parallel_jobs, Arc::clone(&stats))?;
        let loader = StaticModuleLoader::new(&config.identity_calls);

        debug!(%root, threads = analyzer.threads(), "created build context");
        Ok(Self {
            root: root.to_owned(),
            config,
            resolver,
            loader,
            analyzer,
            stats,
        })
    }

    /// Project root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Loaded configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Import resolver for the project.
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Gallery module loader.
    #[inline]
    #[must_use]
    pub fn loader(&self) -> &StaticModuleLoader {
        &self.loader
    }

    /// Parallel file analyzer.
    #[inline]
    #[must_use]
    pub fn analyzer(&self) -> &FileAnalyzer {
        &self.analyzer
    }

    /// Counters shared by every stage of this run.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &Arc<ScanStats> {
        &self.stats
    }

    /// Absolute application routes directory.
    #[must_use]
    pub fn app_dir(&self) -> Utf8PathBuf {
        absolutize(&self.root, &self.config.app_dir)
    }

    /// Absolute directory receiving the manifest and usage file.
    #[must_use]
    pub fn gallery_dir(&self) -> Utf8PathBuf {
        absolutize(&self.root, &self.config.gallery_dir)
    }

    /// Paths of the generated catalog files.
    #[must_use]
    pub fn manifest_files(&self) -> ManifestFiles {
        ManifestFiles::in_dir(&self.gallery_dir())
    }

    /// Theme combinations previews are rendered under.
    #[must_use]
    pub fn theme_combos(&self) -> Vec<ThemeCombo> {
        ThemeCombo::product(&self.config.preview.variants, &self.config.preview.backgrounds)
    }

    /// Absolute path of a file in the cache directory.
    #[must_use]
    pub fn cache_file(&self, name: &str) -> Utf8PathBuf {
        absolutize(&self.root, &self.config.cache_dir).join(name)
    }

    /// The catalog pipeline's mtime cache.
    #[must_use]
    pub fn usage_cache(&self) -> CacheStore {
        CacheStore::new(&self.cache_file(&self.config.usage_cache_file), &self.root)
    }

    /// The export cache of one barrel target.
    #[must_use]
    pub fn barrel_cache(&self, target: &BarrelTarget) -> BarrelCache {
        BarrelCache::load(&self.cache_file(&target.cache_file), &self.root)
    }

    /// Files whose changes trigger the catalog pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Scan`] if the project cannot be walked.
    pub fn tracked_files(&self) -> Result<Vec<Utf8PathBuf>, CatalogError> {
        self.collect(&self.config.tracked_patterns)
    }

    /// Gallery modules, in sorted path order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Scan`] if the project cannot be walked.
    pub fn gallery_files(&self) -> Result<Vec<Utf8PathBuf>, CatalogError> {
        self.collect(&self.config.gallery_patterns)
    }

    /// Looks up a barrel target by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownBarrel`] if no target has that name.
    pub fn barrel(&self, name: &str) -> Result<&BarrelTarget, CatalogError> {
        self.config
            .barrel(name)
            .ok_or_else(|| CatalogError::UnknownBarrel(name.to_owned()))
    }

    fn collect(&self, patterns: &[String]) -> Result<Vec<Utf8PathBuf>, CatalogError> {
        Ok(SourceWalker::new(&self.root)?
            .with_patterns(patterns)?
            .collect_paths()?)
    }
}
