use std::fmt;
use std::path::Path;
use std::str::FromStr;
use anyhow::Result;

use crate::process;
use crate::settings::Settings;
use crate::{hyprpaper, swww};

/// The wallpaper daemon that ends up drawing the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Swww,
    Hyprpaper,
}

impl FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "swww" => Ok(Engine::Swww),
            "hyprpaper" => Ok(Engine::Hyprpaper),
            other => anyhow::bail!("Wallpaper engine '{}' is not supported (use swww or hyprpaper)", other),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl Engine {
    pub fn binary(self) -> &'static str {
        match self {
            Engine::Swww => "swww",
            Engine::Hyprpaper => "hyprpaper",
        }
    }

    // Strategy pattern: dispatch on the configured backend
    pub fn apply(self, screen: &str, wallpaper: &Path, settings: &Settings) -> Result<()> {
        process::require_tool(self.binary())?;
        match self {
            Engine::Swww => swww::apply(screen, wallpaper, settings),
            Engine::Hyprpaper => {
                tracing::debug!(
                    "hyprpaper has no resize or transition options, ignoring fill mode {:?}",
                    settings.fill_mode
                );
                hyprpaper::apply(screen, wallpaper, &settings.hyprpaper_config)
            }
        }
    }
}
