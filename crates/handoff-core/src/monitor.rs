//! Rough context-window usage, estimated from the size of the assistant's
//! session files on disk. There is no token count to read, so this assumes
//! about four bytes per token.

use crate::error::{HandoffError, Result};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_THRESHOLD: u8 = 80;
pub const CHECK_INTERVAL_SECS: u64 = 30;
pub const WINDOW_TOKENS: u64 = 200_000;
pub const BYTES_PER_TOKEN: u64 = 4;
pub const BAR_WIDTH: usize = 50;

/// Single context files, relative to the home directory, in probe order.
const CONTEXT_FILES: &[&str] = &[
    ".claude/context/current.json",
    ".claude/sessions/current/context.json",
    ".config/claude-code/context.json",
    "Library/Application Support/Claude Code/context.json",
];

/// Directories whose `*.json` files are summed when no context file exists.
const SESSION_DIRS: &[&str] = &[
    ".claude/sessions",
    "Library/Application Support/Claude Code/sessions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContextStatus {
    Ok,
    Moderate,
    Warning,
    Critical,
}

impl ContextStatus {
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 90.0 {
            ContextStatus::Critical
        } else if pct >= 80.0 {
            ContextStatus::Warning
        } else if pct >= 60.0 {
            ContextStatus::Moderate
        } else {
            ContextStatus::Ok
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextStatus::Ok => "OK",
            ContextStatus::Moderate => "MODERATE",
            ContextStatus::Warning => "WARNING",
            ContextStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for ContextStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextUsage {
    pub tokens_used: u64,
    pub tokens_total: u64,
    /// Rounded to one decimal, capped at 100.
    pub percentage: f64,
    pub status: ContextStatus,
    pub file_size: u64,
    pub context_path: Option<PathBuf>,
}

impl ContextUsage {
    pub fn from_bytes(file_size: u64, context_path: Option<PathBuf>) -> Self {
        let tokens_used = file_size / BYTES_PER_TOKEN;
        let raw = tokens_used as f64 * 100.0 / WINDOW_TOKENS as f64;
        let percentage = (raw.min(100.0) * 10.0).round() / 10.0;
        Self {
            tokens_used,
            tokens_total: WINDOW_TOKENS,
            percentage,
            status: ContextStatus::from_percentage(percentage),
            file_size,
            context_path,
        }
    }

    pub fn should_handoff(&self, threshold: u8) -> bool {
        self.percentage >= f64::from(threshold)
    }

    /// Within ten points below the threshold.
    pub fn approaching(&self, threshold: u8) -> bool {
        !self.should_handoff(threshold) && self.percentage >= f64::from(threshold) - 10.0
    }

    pub fn bar(&self) -> String {
        status_bar(self.percentage, self.status, BAR_WIDTH)
    }
}

pub fn status_bar(percentage: f64, status: ContextStatus, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64) as usize;
    let fill = if status >= ContextStatus::Warning {
        '█'
    } else {
        '│'
    };
    let mut bar: String = std::iter::repeat(fill).take(filled).collect();
    bar.extend(std::iter::repeat('░').take(width - filled));
    bar
}

/// First existing context file under `home`.
pub fn find_context_file(home: &Path) -> Option<PathBuf> {
    CONTEXT_FILES
        .iter()
        .map(|rel| home.join(rel))
        .find(|p| p.is_file())
}

fn json_bytes(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    let mut total = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if meta.is_dir() {
            total += json_bytes(&path);
        } else if path.extension().is_some_and(|e| e == "json") {
            total += meta.len();
        }
    }
    total
}

/// Estimate usage from the files under `home`. Unreadable files count as
/// empty rather than failing the check.
pub fn estimate(home: &Path) -> ContextUsage {
    if let Some(path) = find_context_file(home) {
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        tracing::debug!(path = %path.display(), size, "context file found");
        return ContextUsage::from_bytes(size, Some(path));
    }
    let size = SESSION_DIRS.iter().map(|rel| json_bytes(&home.join(rel))).sum();
    tracing::debug!(size, "no context file; summed session directories");
    ContextUsage::from_bytes(size, None)
}

/// Estimate usage for the current user's home directory.
pub fn estimate_current() -> Result<ContextUsage> {
    let home = home::home_dir().ok_or(HandoffError::HomeNotFound)?;
    Ok(estimate(&home))
}

/// Settings snippet that runs the check at the start of each session.
pub fn hook_config(command: &str) -> serde_json::Value {
    json!({
        "hooks": {
            "SessionStart": [
                { "hooks": [ { "type": "command", "command": command } ] }
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn status_thresholds() {
        assert_eq!(ContextStatus::from_percentage(0.0), ContextStatus::Ok);
        assert_eq!(ContextStatus::from_percentage(59.9), ContextStatus::Ok);
        assert_eq!(ContextStatus::from_percentage(60.0), ContextStatus::Moderate);
        assert_eq!(ContextStatus::from_percentage(80.0), ContextStatus::Warning);
        assert_eq!(ContextStatus::from_percentage(90.0), ContextStatus::Critical);
    }

    #[test]
    fn usage_from_bytes() {
        let usage = ContextUsage::from_bytes(400_000, None);
        assert_eq!(usage.tokens_used, 100_000);
        assert_eq!(usage.percentage, 50.0);
        assert_eq!(usage.status, ContextStatus::Ok);
        assert!(!usage.should_handoff(80));

        let full = ContextUsage::from_bytes(10_000_000, None);
        assert_eq!(full.percentage, 100.0);
        assert_eq!(full.status, ContextStatus::Critical);
        assert!(full.should_handoff(80));
    }

    #[test]
    fn approaching_window() {
        let usage = ContextUsage::from_bytes(600_000, None); // 75%
        assert!(usage.approaching(80));
        assert!(!usage.approaching(90));
        assert!(!usage.approaching(75));
    }

    #[test]
    fn bar_width_and_fill() {
        let bar = status_bar(50.0, ContextStatus::Ok, 50);
        assert_eq!(bar.chars().count(), 50);
        assert_eq!(bar.chars().filter(|&c| c == '│').count(), 25);
        let bar = status_bar(100.0, ContextStatus::Critical, 10);
        assert_eq!(bar, "██████████");
    }

    #[test]
    fn prefers_context_file() {
        let home = TempDir::new().unwrap();
        let ctx = home.path().join(".config/claude-code/context.json");
        std::fs::create_dir_all(ctx.parent().unwrap()).unwrap();
        std::fs::write(&ctx, vec![b'x'; 4000]).unwrap();
        let sessions = home.path().join(".claude/sessions/a");
        std::fs::create_dir_all(&sessions).unwrap();
        std::fs::write(sessions.join("s.json"), vec![b'x'; 8000]).unwrap();

        let usage = estimate(home.path());
        assert_eq!(usage.context_path.as_deref(), Some(ctx.as_path()));
        assert_eq!(usage.tokens_used, 1000);
    }

    #[test]
    fn sums_session_json_files() {
        let home = TempDir::new().unwrap();
        let sessions = home.path().join(".claude/sessions");
        std::fs::create_dir_all(sessions.join("nested")).unwrap();
        std::fs::write(sessions.join("a.json"), vec![b'x'; 400]).unwrap();
        std::fs::write(sessions.join("nested/b.json"), vec![b'x'; 400]).unwrap();
        std::fs::write(sessions.join("notes.txt"), vec![b'x'; 4000]).unwrap();

        let usage = estimate(home.path());
        assert_eq!(usage.context_path, None);
        assert_eq!(usage.file_size, 800);
        assert_eq!(usage.tokens_used, 200);
    }

    #[test]
    fn empty_home_is_zero() {
        let home = TempDir::new().unwrap();
        let usage = estimate(home.path());
        assert_eq!(usage.tokens_used, 0);
        assert_eq!(usage.status, ContextStatus::Ok);
    }

    #[test]
    fn hook_snippet_shape() {
        let hook = hook_config("handoff monitor --threshold 85");
        assert_eq!(
            hook["hooks"]["SessionStart"][0]["hooks"][0]["command"],
            "handoff monitor --threshold 85"
        );
    }
}
