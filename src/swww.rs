//! swww backend.
//!
//! swww keeps its own per-output state, so all we do is make sure the daemon
//! answers and hand it the image together with the transition settings.

use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::process;
use crate::settings::Settings;

const DAEMON_STARTUP_WAIT: Duration = Duration::from_millis(150);

/// Maps edge smoothness (0 = hard edge, 1 = softest) onto `--transition-step`.
pub fn transition_step(smoothness: f64) -> u8 {
    let step = (255.0 * (1.0 - smoothness.clamp(0.0, 1.0))).round();
    step.max(1.0) as u8
}

/// Arguments for `swww img`, without the program name.
pub fn img_args(screen: &str, wallpaper: &Path, settings: &Settings) -> Vec<String> {
    let transition = &settings.transition;
    vec![
        "img".to_string(),
        "-o".to_string(),
        screen.to_string(),
        "--resize".to_string(),
        settings.fill_mode.as_arg().to_string(),
        "--fill-color".to_string(),
        settings.fill_color.clone(),
        "--transition-type".to_string(),
        transition.kind.clone(),
        "--transition-duration".to_string(),
        (transition.duration_ms / 1000.0).to_string(),
        "--transition-step".to_string(),
        transition_step(transition.smoothness).to_string(),
        wallpaper.to_string_lossy().into_owned(),
    ]
}

fn ensure_daemon() -> Result<()> {
    let answering = Command::new("swww")
        .arg("query")
        .output()
        .context("Failed to run swww query")?
        .status
        .success();
    if !answering {
        info!("swww-daemon not running, starting it");
        process::spawn_detached("swww-daemon", &[])?;
        // Give the daemon a moment to create its socket
        thread::sleep(DAEMON_STARTUP_WAIT);
    }
    Ok(())
}

pub fn apply(screen: &str, wallpaper: &Path, settings: &Settings) -> Result<()> {
    info!("Applying wallpaper via swww on {}...", screen);
    process::pkill("hyprpaper");
    ensure_daemon()?;

    let args = img_args(screen, wallpaper, settings);
    debug!("swww {}", args.join(" "));
    let output = Command::new("swww")
        .args(&args)
        .output()
        .context("Failed to run swww img")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("swww failed to set wallpaper: {}", stderr.trim());
    }
    Ok(())
}
