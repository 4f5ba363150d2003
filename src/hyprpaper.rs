//! hyprpaper backend.
//!
//! hyprpaper reads its assignments from `hyprpaper.conf` at startup, so we
//! rewrite that file and restart the daemon.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::merge::{self, MergeOutcome};
use crate::process;

const DAEMON_EXIT_WAIT: Duration = Duration::from_secs(2);

/// Reads the config as lines. A missing file is an empty document.
/// Lines are split on '\n' only, so a trailing '\r' stays part of the line.
pub fn read_config(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.split_terminator('\n').map(str::to_string).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Where the rename has to land: the real file behind a symlink, or `path` itself.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(real) => Ok(real),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e).with_context(|| format!("Failed to resolve {}", path.display())),
    }
}

/// Replaces `path` with `lines` in one rename. The old file stays intact if anything fails.
/// Symlinks are followed and the existing file's permissions are kept.
pub fn write_config_atomic(path: &Path, lines: &[String]) -> Result<()> {
    let target = resolve_target(path)?;
    let path = target.as_path();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    let mut content = lines.join("\n");
    content.push('\n');
    tmp.write_all(content.as_bytes()).context("Failed to write temporary config")?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .context("Failed to copy permissions onto temporary config")?;
    }
    tmp.as_file().sync_all().context("Failed to sync temporary config")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Merges the new assignment into the config file on disk.
pub fn update_config(path: &Path, screen: &str, wallpaper: &str) -> Result<MergeOutcome> {
    if !merge::is_valid_screen(screen) {
        anyhow::bail!("Output name '{}' cannot be written to {}", screen, path.display());
    }
    let wallpaper = wallpaper.trim();
    let existing = read_config(path)?;
    let outcome = merge::merge(&existing, screen, wallpaper);
    write_config_atomic(path, &outcome.lines)?;
    Ok(outcome)
}

fn restart_daemon() -> Result<()> {
    process::pkill("swww-daemon");
    process::pkill("hyprpaper");
    // The old instance still holds its socket until it has exited
    if !process::wait_for_exit("hyprpaper", DAEMON_EXIT_WAIT) {
        warn!("hyprpaper is still running after {:?}, starting anyway", DAEMON_EXIT_WAIT);
    }
    process::spawn_detached("hyprpaper", &[])
}

pub fn apply(screen: &str, wallpaper: &Path, config_path: &Path) -> Result<()> {
    info!("Applying wallpaper via hyprpaper on {}...", screen);
    let wallpaper = wallpaper.to_string_lossy();
    let outcome = update_config(config_path, screen, &wallpaper)?;

    if outcome.replaced {
        info!("Updated {} in {}", screen, config_path.display());
    } else {
        info!("Added {} to {}", screen, config_path.display());
    }
    for path in &outcome.orphaned {
        warn!("{} is assigned in {} but never preloaded", path, config_path.display());
    }

    // Config must be on disk before hyprpaper starts reading it
    restart_daemon()
}
