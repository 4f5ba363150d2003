use clap::Parser;

use crate::merge;

pub const USAGE: &str = "Usage: wp-apply <screen> <wallpaper>";

/// Apply a wallpaper to one display output using swww or hyprpaper
#[derive(Parser, Debug)]
#[command(name = "wp-apply", version, about, long_about = None)]
pub struct Args {
    /// Output identifier, e.g. eDP-1 or HDMI-A-1
    pub screen: String,

    /// Path to the wallpaper image
    pub wallpaper: String,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Returns the reason the arguments are unusable, if any.
    pub fn validate(&self) -> Option<&'static str> {
        if self.screen.trim().is_empty() {
            Some("screen must not be empty")
        } else if !merge::is_valid_screen(&self.screen) {
            Some("screen must not contain commas or surrounding whitespace")
        } else if self.wallpaper.trim().is_empty() {
            Some("wallpaper path must not be empty")
        } else {
            None
        }
    }
}
