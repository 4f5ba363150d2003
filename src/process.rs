use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use anyhow::{Context, Result};
use tracing::debug;

/// Looks up a required binary on $PATH.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).with_context(|| format!("Required tool '{}' was not found in $PATH", name))
}

/// True if a process with exactly this name is running.
pub fn is_running(name: &str) -> bool {
    Command::new("pgrep")
        .arg("-x")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

// Competing daemons fight over the layer surface, so stop them first.
pub fn pkill(name: &str) {
    if is_running(name) {
        debug!("Stopping {}", name);
        Command::new("pkill").arg("-x").arg(name).status().ok();
    }
}

/// Polls until no process with this name is left. Returns false on timeout.
pub fn wait_for_exit(name: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while is_running(name) {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(50));
    }
    true
}

/// Starts a daemon that outlives us. Output is discarded.
pub fn spawn_detached(program: &str, args: &[&str]) -> Result<()> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_tool_missing() {
        let err = require_tool("wp-apply-no-such-binary").unwrap_err();
        assert!(err.to_string().contains("wp-apply-no-such-binary"));
    }

    #[test]
    fn test_wait_for_exit_when_nothing_runs() {
        let started = Instant::now();
        assert!(wait_for_exit("wp-apply-no-such-process", Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
