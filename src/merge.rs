//! Hyprpaper config rewriting.
//!
//! Takes the lines of an existing `hyprpaper.conf` and produces a new document
//! where `screen` shows `path`. Lines we don't understand are kept verbatim and
//! in order; `preload` lines come next, then `wallpaper` assignments.

use std::collections::HashSet;

/// One line of a hyprpaper config, as far as the merge cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLine {
    Preserved(String),
    Preload(String),
    Assignment { screen: String, path: String },
}

impl ConfigLine {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim_start();
        if let Some(value) = key_value(trimmed, "preload") {
            if !value.is_empty() {
                return ConfigLine::Preload(value.to_string());
            }
        } else if let Some(value) = key_value(trimmed, "wallpaper") {
            if let Some((screen, path)) = value.split_once(',') {
                return ConfigLine::Assignment {
                    screen: screen.trim().to_string(),
                    path: path.trim().to_string(),
                };
            }
        }
        ConfigLine::Preserved(line.to_string())
    }

    pub fn render(&self) -> String {
        match self {
            ConfigLine::Preserved(raw) => raw.clone(),
            ConfigLine::Preload(path) => format!("preload = {}", path),
            ConfigLine::Assignment { screen, path } => format!("wallpaper = {},{}", screen, path),
        }
    }
}

/// Returns the trimmed value of `key = value`, or None if the line is some other key.
fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?;
    let value = rest.trim_start().strip_prefix('=')?;
    Some(value.trim())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub lines: Vec<String>,
    /// The target screen already had an assignment that got replaced.
    pub replaced: bool,
    /// Paths assigned to other screens that no `preload` line covers.
    pub orphaned: Vec<String>,
}

/// True if `screen` survives a render/parse cycle unchanged: non-empty, no
/// surrounding whitespace, no comma.
pub fn is_valid_screen(screen: &str) -> bool {
    !screen.is_empty() && screen.trim() == screen && !screen.contains(',')
}

/// Rewrites `existing` so that `screen` shows `wallpaper`. Never fails.
///
/// `screen` must satisfy [`is_valid_screen`] and `wallpaper` must be trimmed,
/// otherwise the emitted lines parse back differently and a second merge
/// duplicates them.
pub fn merge<S: AsRef<str>>(existing: &[S], screen: &str, wallpaper: &str) -> MergeOutcome {
    let mut preserved = Vec::new();
    let mut preloads: Vec<String> = Vec::new();
    let mut assignments: Vec<(String, String)> = Vec::new();

    let mut preloaded: HashSet<String> = HashSet::new();
    let mut assigned_paths: Vec<String> = Vec::new();
    let mut seen_screens: HashSet<String> = HashSet::new();
    let mut replaced = false;

    for line in existing {
        match ConfigLine::parse(line.as_ref()) {
            ConfigLine::Preserved(raw) => preserved.push(raw),
            ConfigLine::Preload(path) => {
                if preloaded.insert(path.clone()) {
                    preloads.push(path);
                }
            }
            ConfigLine::Assignment { screen: s, path } => {
                if s == screen {
                    replaced = true;
                    continue;
                }
                if !seen_screens.insert(s.clone()) {
                    continue;
                }
                if !assigned_paths.contains(&path) {
                    assigned_paths.push(path.clone());
                }
                assignments.push((s, path));
            }
        }
    }

    if !preloaded.contains(wallpaper) {
        preloaded.insert(wallpaper.to_string());
        preloads.push(wallpaper.to_string());
    }
    assignments.push((screen.to_string(), wallpaper.to_string()));

    let orphaned = assigned_paths
        .into_iter()
        .filter(|p| !preloaded.contains(p))
        .collect();

    let lines = preserved
        .into_iter()
        .map(ConfigLine::Preserved)
        .chain(preloads.into_iter().map(ConfigLine::Preload))
        .chain(
            assignments
                .into_iter()
                .map(|(screen, path)| ConfigLine::Assignment { screen, path }),
        )
        .map(|l| l.render())
        .collect();

    MergeOutcome { lines, replaced, orphaned }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(outcome: &MergeOutcome) -> Vec<&str> {
        outcome.lines.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_line_kinds() {
        assert_eq!(ConfigLine::parse("preload = /a.png"), ConfigLine::Preload("/a.png".into()));
        assert_eq!(ConfigLine::parse("  preload=/a.png  "), ConfigLine::Preload("/a.png".into()));
        assert_eq!(
            ConfigLine::parse("wallpaper = eDP-1 , /a b.png"),
            ConfigLine::Assignment { screen: "eDP-1".into(), path: "/a b.png".into() }
        );
        // split happens on the first comma only
        assert_eq!(
            ConfigLine::parse("wallpaper = DP-2,/pics/a,b.png"),
            ConfigLine::Assignment { screen: "DP-2".into(), path: "/pics/a,b.png".into() }
        );
    }

    #[test]
    fn test_parse_malformed_is_preserved() {
        for raw in [
            "wallpaper = eDP-1",
            "preload =",
            "# preload = /a.png",
            "splash = false",
            "preloadx = /a.png",
            "",
        ] {
            assert_eq!(ConfigLine::parse(raw), ConfigLine::Preserved(raw.to_string()), "{raw:?}");
        }
    }

    #[test]
    fn test_replaces_existing_screen() {
        let doc = ["monitor = eDP-1", "preload = /a.png", "wallpaper = eDP-1,/a.png"];
        let out = merge(&doc, "eDP-1", "/b.png");
        assert_eq!(
            lines(&out),
            ["monitor = eDP-1", "preload = /a.png", "preload = /b.png", "wallpaper = eDP-1,/b.png"]
        );
        assert!(out.replaced);
    }

    #[test]
    fn test_empty_document() {
        let out = merge::<&str>(&[], "HDMI-1", "/x.png");
        assert_eq!(lines(&out), ["preload = /x.png", "wallpaper = HDMI-1,/x.png"]);
        assert!(!out.replaced);
    }

    #[test]
    fn test_same_path_other_screen_untouched() {
        let doc = ["preload = /x.png", "wallpaper = HDMI-1,/x.png", "wallpaper = eDP-1,/x.png"];
        let out = merge(&doc, "HDMI-1", "/x.png");
        assert_eq!(
            lines(&out),
            ["preload = /x.png", "wallpaper = eDP-1,/x.png", "wallpaper = HDMI-1,/x.png"]
        );
    }

    #[test]
    fn test_new_screen_appended_after_others() {
        let doc = [
            "splash = false",
            "preload = /a.png",
            "wallpaper = DP-1,/a.png",
            "ipc = on",
            "wallpaper = DP-2,/a.png",
        ];
        let out = merge(&doc, "HDMI-A-1", "/a.png");
        assert_eq!(
            lines(&out),
            [
                "splash = false",
                "ipc = on",
                "preload = /a.png",
                "wallpaper = DP-1,/a.png",
                "wallpaper = DP-2,/a.png",
                "wallpaper = HDMI-A-1,/a.png",
            ]
        );
        assert!(!out.replaced);
    }

    #[test]
    fn test_exactly_one_preload_and_assignment_for_target() {
        let doc = [
            "preload = /b.png",
            "preload = /b.png",
            "wallpaper = eDP-1,/a.png",
            "wallpaper = eDP-1,/c.png",
        ];
        let out = merge(&doc, "eDP-1", "/b.png");
        let preloads = out.lines.iter().filter(|l| *l == "preload = /b.png").count();
        let assigned = out.lines.iter().filter(|l| l.starts_with("wallpaper = eDP-1,")).count();
        assert_eq!(preloads, 1);
        assert_eq!(assigned, 1);
        assert_eq!(lines(&out), ["preload = /b.png", "wallpaper = eDP-1,/b.png"]);
    }

    #[test]
    fn test_path_only_on_other_assignment_still_preloaded() {
        let doc = ["wallpaper = DP-1,/shared.png"];
        let out = merge(&doc, "DP-2", "/shared.png");
        assert_eq!(
            lines(&out),
            ["preload = /shared.png", "wallpaper = DP-1,/shared.png", "wallpaper = DP-2,/shared.png"]
        );
        assert!(out.orphaned.is_empty());
    }

    #[test]
    fn test_reports_orphaned_paths() {
        let doc = ["wallpaper = DP-1,/lonely.png"];
        let out = merge(&doc, "DP-2", "/other.png");
        assert_eq!(out.orphaned, vec!["/lonely.png".to_string()]);
    }

    #[test]
    fn test_path_equality_is_literal() {
        let doc = ["preload = /walls/a.png"];
        let out = merge(&doc, "eDP-1", "/walls//a.png");
        assert_eq!(
            lines(&out),
            ["preload = /walls/a.png", "preload = /walls//a.png", "wallpaper = eDP-1,/walls//a.png"]
        );
    }

    #[test]
    fn test_valid_screen() {
        assert!(is_valid_screen("eDP-1"));
        assert!(is_valid_screen("HDMI-A-1"));
        assert!(!is_valid_screen(""));
        assert!(!is_valid_screen("A,B"));
        assert!(!is_valid_screen(" DP-1"));
        assert!(!is_valid_screen("DP-1\t"));
    }

    #[test]
    fn test_valid_inputs_round_trip_through_parse() {
        for (screen, path) in [("eDP-1", "/a.png"), ("DP-2", "/pics/a,b.png"), ("X", "/has space.png")] {
            assert!(is_valid_screen(screen));
            let once = merge::<&str>(&[], screen, path);
            let twice = merge(&once.lines, screen, path);
            assert_eq!(once.lines, twice.lines, "{screen} {path}");
            assert_eq!(
                ConfigLine::parse(&once.lines[1]),
                ConfigLine::Assignment { screen: screen.into(), path: path.into() }
            );
        }
    }

    #[test]
    fn test_idempotent() {
        let doc = [
            "# managed by wp-apply",
            "preload = /a.png",
            "wallpaper = DP-1,/a.png",
            "splash = true",
            "wallpaper = eDP-1,/a.png",
        ];
        let once = merge(&doc, "eDP-1", "/b.png");
        let twice = merge(&once.lines, "eDP-1", "/b.png");
        assert_eq!(once.lines, twice.lines);
        assert!(twice.replaced);
    }

    #[test]
    fn test_preserved_lines_keep_order_and_bytes() {
        let doc = [
            "  splash = false  ",
            "wallpaper = broken",
            "preload = /a.png",
            "\tipc = off",
        ];
        let out = merge(&doc, "eDP-1", "/a.png");
        let preserved: Vec<&str> = out
            .lines
            .iter()
            .map(String::as_str)
            .take_while(|l| !l.starts_with("preload"))
            .collect();
        assert_eq!(preserved, ["  splash = false  ", "wallpaper = broken", "\tipc = off"]);
    }

    #[test]
    fn test_other_screens_keep_relative_order() {
        let doc = [
            "wallpaper = C,/c.png",
            "wallpaper = A,/a.png",
            "wallpaper = B,/b.png",
        ];
        let out = merge(&doc, "A", "/n.png");
        let screens: Vec<&str> = out
            .lines
            .iter()
            .filter_map(|l| l.strip_prefix("wallpaper = "))
            .map(|l| l.split(',').next().unwrap_or_default())
            .collect();
        assert_eq!(screens, ["C", "B", "A"]);
    }
}
