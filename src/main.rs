//! Wallpaper Applier (wp-apply)
//!
//! Sets the wallpaper of a single output.
//! 1. Reads `~/.config/wp-apply/settings.json` (or `$WP_APPLY_SETTINGS`).
//! 2. Falls back to the configured default if the requested image is missing.
//! 3. Hands off to the configured engine: `swww` directly, or `hyprpaper` by
//!    rewriting `hyprpaper.conf` and restarting the daemon.

mod cli;
mod engine;
mod hyprpaper;
mod merge;
mod process;
mod settings;
mod swww;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::Args;
use engine::Engine;
use settings::{Settings, expand_path};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Picks the image to show. A missing request falls back to the default with a warning.
fn resolve_wallpaper(requested: &str, default: Option<&Path>) -> Result<PathBuf> {
    let requested = expand_path(requested.trim());
    if requested.exists() {
        return Ok(requested);
    }
    let default = default.with_context(|| {
        format!("Wallpaper {} does not exist and no default is configured", requested.display())
    })?;
    if !default.exists() {
        anyhow::bail!(
            "Wallpaper {} does not exist and default {} is missing too",
            requested.display(),
            default.display()
        );
    }
    warn!("Wallpaper {} not found, using default {}", requested.display(), default.display());
    Ok(default.to_path_buf())
}

fn run(args: Args) -> Result<()> {
    let settings = Settings::load()?;
    if !settings.enabled {
        info!("Wallpaper management is disabled in settings, nothing to do");
        return Ok(());
    }

    let wallpaper = resolve_wallpaper(&args.wallpaper, settings.default_wallpaper.as_deref())?;
    let engine: Engine = settings.engine.parse()?;
    engine.apply(&args.screen, &wallpaper, &settings)?;
    info!("Wallpaper set to {} on {} ({})", wallpaper.display(), args.screen, engine);
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{}", cli::USAGE);
            eprintln!("{}", e.kind());
            return ExitCode::from(1);
        }
    };
    if let Some(reason) = args.validate() {
        eprintln!("{}", cli::USAGE);
        eprintln!("{}", reason);
        return ExitCode::from(1);
    }

    init_logging(args.verbose);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wp-apply: {:#}", e);
            ExitCode::from(1)
        }
    }
}
