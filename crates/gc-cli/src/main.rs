//! CLI entry point for the gallery catalog generator.
//!
//! This binary regenerates the build-time artifacts of the component
//! gallery: the preview manifest, the usage map, and the barrel files.
//!
//! # Usage
//!
//! ```bash
//! gallery-gen [OPTIONS] <COMMAND>
//!
//! # Rebuild the manifest and usage map if anything changed
//! gallery-gen usage
//!
//! # Regenerate every barrel target unconditionally
//! gallery-gen barrel --force
//!
//! # Run whatever is stale (used from a pre-dev hook)
//! gallery-gen regen
//!
//! # Verify the committed manifest
//! gallery-gen check
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod gate;

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use gc_catalog::{
    barrel_changed, check_on_disk, check_runtime_on_disk, preview_routes, run_barrel, run_usage,
    usage_changed, BarrelReport, BuildContext, ManifestFiles, Outcome, UsageReport,
};
use gc_core::{config::absolutize, BarrelTarget, Config};
use gc_scanner::StatsSnapshot;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::gate::Gate;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Build-time generator for the component gallery catalog.
///
/// Analyzes gallery modules and application routes, then writes the preview
/// manifest, usage map, and barrel files the gallery consumes.
#[derive(Parser)]
#[command(name = "gallery-gen", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Project root containing `tsconfig.json` and `gallery.config.json`.
    #[arg(short, long, global = true, env = "GALLERY_ROOT", default_value = ".")]
    root: Utf8PathBuf,

    /// Configuration file, relative to the root.
    ///
    /// Defaults to `gallery.config.json`; built-in defaults apply if that
    /// file does not exist.
    #[arg(short, long, global = true, env = "GALLERY_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Increase logging verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Run even if this binary is older than `engine.minimumVersion`.
    #[arg(long, global = true)]
    skip_version_check: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Rebuild the preview manifest and usage map.
    Usage {
        /// Ignore the cache and always rebuild.
        #[arg(short, long)]
        force: bool,
    },

    /// Regenerate barrel files.
    Barrel {
        /// Only this target (defaults to every configured target).
        #[arg(short, long)]
        target: Option<String>,

        /// Ignore the cache and always regenerate.
        #[arg(short, long)]
        force: bool,
    },

    /// Run every pipeline whose inputs changed.
    Regen {
        /// Skip all work, as on CI. Implied by `CI=true` or `CI=1`.
        #[arg(long)]
        ci: bool,
    },

    /// Validate the generated manifest on disk.
    Check,

    /// Print the generated preview routes.
    Routes {
        /// Print full route records as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// One unit of work scheduled by `regen`.
enum Task<'a> {
    Barrel(&'a BarrelTarget),
    Usage,
}

impl Task<'_> {
    fn label(&self) -> String {
        match self {
            Self::Barrel(target) => format!("barrel {}", target.name),
            Self::Usage => "gallery usage".to_owned(),
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise the level
/// is `info`, raised to `debug` by `-v` and `trace` by `-vv`. Logs go to
/// stderr so stdout stays parseable.
fn init_tracing(verbose: u8, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Resolves `--root` to an absolute UTF-8 directory.
fn project_root(cli: &Cli) -> color_eyre::Result<Utf8PathBuf> {
    let root = cli
        .root
        .canonicalize_utf8()
        .wrap_err_with(|| format!("Project root does not exist: {}", cli.root))?;
    if !root.is_dir() {
        return Err(eyre!("Project root is not a directory: {root}"));
    }
    Ok(root)
}

/// Loads the project configuration.
fn load_config(cli: &Cli, root: &Utf8Path) -> color_eyre::Result<Config> {
    Config::load(root, cli.config.as_deref())
        .wrap_err_with(|| format!("Failed to load configuration for {root}"))
}

/// Loads the configuration, applies the environment gate, and creates a
/// [`BuildContext`].
///
/// # Errors
///
/// Returns an error if the root or configuration is invalid, the binary is
/// older than the project requires, or the tsconfig cannot be read.
fn create_context(cli: &Cli) -> color_eyre::Result<BuildContext> {
    let root = project_root(cli)?;
    let config = load_config(cli, &root)?;

    let gate = gate::check(
        config.engine.minimum_version.as_deref(),
        env!("CARGO_PKG_VERSION"),
        cli.skip_version_check || gate::ci_from_env(),
    )?;
    if let Gate::Bypassed { required, running } = gate {
        warn!(%required, %running, "gallery-gen is older than the project requires; continuing");
    }

    BuildContext::new(&root, config)
        .wrap_err_with(|| format!("Failed to initialize build for {root}"))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the catalog pipeline.
///
/// # Errors
///
/// Returns an error if any stage fails; nothing is written in that case.
fn run_usage_command(cli: &Cli, force: bool) -> color_eyre::Result<()> {
    let ctx = create_context(cli)?;
    info!(root = %ctx.root(), force, "Building gallery usage");

    let outcome = run_usage(&ctx, force).wrap_err("Gallery usage generation failed")?;
    match outcome {
        Outcome::Skipped => print_line("Gallery usage is up to date"),
        Outcome::Completed(report) => print_usage_report(&report, &ctx.stats().snapshot()),
    }
}

/// Runs the barrel pipeline for one target or all of them.
///
/// # Errors
///
/// Returns an error if the target is unknown or generation fails.
fn run_barrel_command(cli: &Cli, target: Option<&str>, force: bool) -> color_eyre::Result<()> {
    let ctx = create_context(cli)?;

    let targets: Vec<&BarrelTarget> = match target {
        Some(name) => vec![ctx.barrel(name)?],
        None => ctx.config().barrels.iter().collect(),
    };

    for target in targets {
        let outcome = run_barrel(&ctx, target, force)
            .wrap_err_with(|| format!("Barrel generation failed for target {}", target.name))?;
        match outcome {
            Outcome::Skipped => print_line(&format!("Barrel {} is up to date", target.name))?,
            Outcome::Completed(report) => print_barrel_report(&report)?,
        }
    }
    Ok(())
}

/// Runs every stale pipeline behind a progress bar.
///
/// # Errors
///
/// Returns an error from the first pipeline that fails.
fn run_regen(cli: &Cli, ci: bool) -> color_eyre::Result<()> {
    if ci || gate::ci_from_env() {
        return print_line("Skipping regeneration tasks");
    }

    let ctx = create_context(cli)?;
    let mut tasks = Vec::new();
    for target in &ctx.config().barrels {
        if barrel_changed(&ctx, target)? {
            tasks.push(Task::Barrel(target));
        }
    }
    if usage_changed(&ctx)? {
        tasks.push(Task::Usage);
    }

    if tasks.is_empty() {
        return print_line("Skipping regeneration tasks");
    }

    let bar = ProgressBar::new(tasks.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(100));

    for task in &tasks {
        bar.set_message(task.label());
        match task {
            Task::Barrel(target) => {
                run_barrel(&ctx, target, true)
                    .wrap_err_with(|| format!("Barrel generation failed for target {}", target.name))?;
            }
            Task::Usage => {
                run_usage(&ctx, true).wrap_err("Gallery usage generation failed")?;
            }
        }
        bar.inc(1);
    }
    bar.finish_with_message("done");

    info!(tasks = tasks.len(), "Regeneration complete");
    Ok(())
}

/// Validates the manifest and its runtime twin on disk.
///
/// Only the configuration is read; no gallery module is evaluated.
///
/// # Errors
///
/// Returns an error naming the stale file and how to regenerate it.
fn run_check(cli: &Cli) -> color_eyre::Result<()> {
    let root = project_root(cli)?;
    let config = load_config(cli, &root)?;
    let files = ManifestFiles::in_dir(&absolutize(&root, &config.gallery_dir));

    check_on_disk(&files.manifest)?;
    check_runtime_on_disk(&files.runtime)?;
    print_line(&format!("Manifest is valid: {}", files.manifest))
}

/// Prints preview routes, one slug per line or as JSON.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or routes collide.
fn run_routes(cli: &Cli, json: bool) -> color_eyre::Result<()> {
    let ctx = create_context(cli)?;
    let routes = preview_routes(&ctx).wrap_err("Preview route generation failed")?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if json {
        let content = serde_json::to_string_pretty(&routes)
            .map_err(|e| eyre!("Failed to serialize JSON: {}", e))?;
        writeln!(handle, "{content}")?;
    } else {
        for route in &routes {
            writeln!(handle, "{}", route.slug)?;
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_line(line: &str) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{line}")?;
    Ok(())
}

/// Prints a summary of a catalog run.
fn print_usage_report(report: &UsageReport, stats: &StatsSnapshot) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    writeln!(handle, "Gallery Usage")?;
    writeln!(handle, "=============")?;
    writeln!(handle)?;
    writeln!(handle, "Gallery modules:    {}", report.modules)?;
    writeln!(handle, "Entries:            {}", report.entries)?;
    writeln!(handle, "Previews:           {}", report.previews)?;
    writeln!(handle, "Preview routes:     {}", report.routes)?;
    writeln!(handle, "App routes scanned: {}", report.app_routes)?;
    writeln!(handle, "Files analyzed:     {}", stats.files)?;
    writeln!(
        handle,
        "Imports resolved:   {} ({:.1}%)",
        stats.resolved,
        stats.resolution_percent()
    )?;
    writeln!(handle)?;
    writeln!(
        handle,
        "Manifest: {} bytes, checksum {}",
        report.manifest.bytes, report.manifest.checksum
    )?;
    Ok(())
}

/// Prints a summary of a barrel run.
fn print_barrel_report(report: &BarrelReport) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(
        handle,
        "Barrel {}: {} files ({} cached) -> {}",
        report.target, report.files, report.reused, report.output
    )?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to appropriate command
    match &cli.command {
        Commands::Usage { force } => run_usage_command(&cli, *force),
        Commands::Barrel { target, force } => run_barrel_command(&cli, target.as_deref(), *force),
        Commands::Regen { ci } => run_regen(&cli, *ci),
        Commands::Check => run_check(&cli),
        Commands::Routes { json } => run_routes(&cli, *json),
    }
}
