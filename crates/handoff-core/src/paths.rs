use crate::error::{HandoffError, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HANDOFFS_DIR: &str = "docs/handoffs";

pub const SKILL_CONFIG_DIR: &str = ".claude/skills/handoff-prompt";
pub const CONFIG_FILE: &str = "config.json";

pub const DOCUMENT_PREFIX: &str = "AI_Continuation_Document-";
pub const DOCUMENT_EXT: &str = "md";

/// `DDMMMYYYY-HHMM`, e.g. `19Oct2026-1405`.
pub const TIMESTAMP_FORMAT: &str = "%d%b%Y-%H%M";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn handoffs_dir(root: &Path) -> PathBuf {
    root.join(HANDOFFS_DIR)
}

pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(SKILL_CONFIG_DIR).join(CONFIG_FILE)
}

pub fn global_config_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(HandoffError::HomeNotFound)?;
    Ok(home.join(SKILL_CONFIG_DIR).join(CONFIG_FILE))
}

/// Base filename for a document generated at `at`, without any collision suffix.
pub fn document_filename(at: NaiveDateTime) -> String {
    format!(
        "{DOCUMENT_PREFIX}{}.{DOCUMENT_EXT}",
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Filename for the `n`th document in the same minute (`n >= 2`).
pub fn document_filename_numbered(at: NaiveDateTime, n: u32) -> String {
    format!(
        "{DOCUMENT_PREFIX}{}-{n}.{DOCUMENT_EXT}",
        at.format(TIMESTAMP_FORMAT)
    )
}

// ---------------------------------------------------------------------------
// Filename parsing
// ---------------------------------------------------------------------------

static STAMP_RE: OnceLock<Regex> = OnceLock::new();

fn stamp_re() -> &'static Regex {
    STAMP_RE.get_or_init(|| Regex::new(r"(\d{2}[A-Za-z]{3}\d{4}-\d{4})").unwrap())
}

/// True for filenames the tool writes.
pub fn is_document_filename(name: &str) -> bool {
    name.starts_with(DOCUMENT_PREFIX) && name.ends_with(".md")
}

/// The raw `DDMMMYYYY-HHMM` stamp embedded in a document filename.
pub fn filename_stamp(name: &str) -> Option<&str> {
    stamp_re().captures(name).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Parse the generation time out of a document filename.
pub fn parse_filename_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stamp = filename_stamp(name)?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
