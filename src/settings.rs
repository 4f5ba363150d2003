//! Settings loader.
//!
//! Reads `settings.json` (see `settings_path`) and turns the loosely typed
//! values into something the engines can use directly. Bad values are
//! replaced with defaults and a warning, never a hard failure.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

pub const SETTINGS_ENV: &str = "WP_APPLY_SETTINGS";

pub const TRANSITION_TYPES: [&str; 12] = [
    "simple", "fade", "left", "right", "top", "bottom", "wipe", "grow", "center", "outer",
    "random", "wave",
];
const DEFAULT_TRANSITION: &str = "fade";
const DEFAULT_FILL_COLOR: &str = "000000";

/// Resolves shell-style paths (e.g., "~/Pictures") to absolute system paths.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

// --- Raw file model ---

#[derive(Deserialize, Debug, Default)]
struct SettingsFile {
    #[serde(default)]
    wallpaper: RawSettings,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    enabled: bool,
    engine: String,
    default: Option<String>,
    fill_mode: String,
    fill_color: String,
    transition: RawTransition,
    hyprpaper_config: Option<String>,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: "swww".to_string(),
            default: None,
            fill_mode: "crop".to_string(),
            fill_color: format!("#{}", DEFAULT_FILL_COLOR),
            transition: RawTransition::default(),
            hyprpaper_config: None,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", default)]
struct RawTransition {
    #[serde(rename = "type")]
    kind: String,
    duration: f64,        // milliseconds
    edge_smoothness: f64, // 0-1 fraction or integer percentage
}

impl Default for RawTransition {
    fn default() -> Self {
        Self {
            kind: DEFAULT_TRANSITION.to_string(),
            duration: 1000.0,
            edge_smoothness: 0.0,
        }
    }
}

// --- Normalized model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Crop,
    Fit,
    Stretch,
    No,
}

impl FillMode {
    /// Value for `swww img --resize`.
    pub fn as_arg(self) -> &'static str {
        match self {
            FillMode::Crop => "crop",
            FillMode::Fit => "fit",
            FillMode::Stretch => "stretch",
            FillMode::No => "no",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub kind: String,
    pub duration_ms: f64,
    /// Always within 0.0..=1.0.
    pub smoothness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    pub engine: String,
    pub default_wallpaper: Option<PathBuf>,
    pub fill_mode: FillMode,
    /// Six hex digits, no leading '#'.
    pub fill_color: String,
    pub transition: Transition,
    pub hyprpaper_config: PathBuf,
}

impl Settings {
    /// Loads settings from `$WP_APPLY_SETTINGS` or the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Self::from_raw(RawSettings::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: SettingsFile = serde_json::from_str(content)?;
        Self::from_raw(file.wallpaper)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let hyprpaper_config = match raw.hyprpaper_config.as_deref() {
            Some(p) if !p.trim().is_empty() => expand_path(p.trim()),
            _ => default_hyprpaper_config()?,
        };
        let default_wallpaper = raw
            .default
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(expand_path);

        let duration_ms = if raw.transition.duration.is_finite() && raw.transition.duration >= 0.0 {
            raw.transition.duration
        } else {
            warn!("Invalid transition duration {}, using 0", raw.transition.duration);
            0.0
        };

        Ok(Self {
            enabled: raw.enabled,
            engine: raw.engine.trim().to_lowercase(),
            default_wallpaper,
            fill_mode: normalize_fill_mode(&raw.fill_mode),
            fill_color: normalize_fill_color(&raw.fill_color),
            transition: Transition {
                kind: normalize_transition(&raw.transition.kind),
                duration_ms,
                smoothness: normalize_smoothness(raw.transition.edge_smoothness),
            },
            hyprpaper_config,
        })
    }
}

pub fn settings_path() -> Result<PathBuf> {
    if let Ok(custom) = env::var(SETTINGS_ENV) {
        if !custom.trim().is_empty() {
            return Ok(expand_path(custom.trim()));
        }
    }
    let config_dir = dirs::config_dir().context("Could not find config directory")?;
    Ok(config_dir.join("wp-apply/settings.json"))
}

fn default_hyprpaper_config() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not find config directory")?;
    Ok(config_dir.join("hypr/hyprpaper.conf"))
}

// --- Normalizers ---

pub fn normalize_transition(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    // Older swww releases called these "none" and "any"
    let name = match lowered.as_str() {
        "none" => "simple",
        "any" => "random",
        other => other,
    };
    if TRANSITION_TYPES.contains(&name) {
        name.to_string()
    } else {
        warn!("Unknown transition type '{}', falling back to '{}'", value, DEFAULT_TRANSITION);
        DEFAULT_TRANSITION.to_string()
    }
}

pub fn normalize_fill_color(value: &str) -> String {
    let hex = value.trim().strip_prefix('#').unwrap_or("");
    let valid = hex.chars().all(|c| c.is_ascii_hexdigit());
    match hex.len() {
        6 if valid => hex.to_lowercase(),
        3 if valid => hex.chars().flat_map(|c| [c, c]).collect::<String>().to_lowercase(),
        _ => {
            warn!("Invalid fill color '{}', expected #rrggbb. Using #{}", value, DEFAULT_FILL_COLOR);
            DEFAULT_FILL_COLOR.to_string()
        }
    }
}

pub fn normalize_fill_mode(value: &str) -> FillMode {
    match value.trim().to_lowercase().as_str() {
        "crop" | "fill" => FillMode::Crop,
        "fit" | "contain" => FillMode::Fit,
        "stretch" => FillMode::Stretch,
        "no" | "none" | "center" => FillMode::No,
        _ => {
            warn!("Unknown fill mode '{}', falling back to 'crop'", value);
            FillMode::Crop
        }
    }
}

/// Accepts either a 0-1 fraction or a percentage.
pub fn normalize_smoothness(value: f64) -> f64 {
    if !value.is_finite() || value < 0.0 {
        warn!("Invalid edge smoothness {}, using 0", value);
        return 0.0;
    }
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    fraction.clamp(0.0, 1.0)
}
