//! Read-only access to the documents under `docs/handoffs/`.

use crate::error::{HandoffError, Result};
use crate::paths;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedDocument {
    pub name: String,
    pub path: PathBuf,
    /// Generation time parsed from the filename.
    pub generated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub modified: Option<SystemTime>,
    pub size: u64,
}

/// Every continuation document under `root`, newest first. The filename
/// timestamp orders documents; modification time breaks ties (and orders
/// files whose name carries no parseable stamp). A missing directory is an
/// empty archive.
pub fn list(root: &Path) -> Result<Vec<ArchivedDocument>> {
    let dir = paths::handoffs_dir(root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut docs = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !paths::is_document_filename(&name) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        docs.push(ArchivedDocument {
            generated_at: paths::parse_filename_timestamp(&name),
            modified: meta.modified().ok(),
            size: meta.len(),
            path: entry.path(),
            name,
        });
    }

    docs.sort_by(|a, b| {
        b.generated_at
            .cmp(&a.generated_at)
            .then_with(|| sequence(&b.name).cmp(&sequence(&a.name)))
            .then_with(|| b.modified.cmp(&a.modified))
    });
    Ok(docs)
}

/// Same-minute collision number: 1 for the plain name, `n` for `-n.md`.
fn sequence(name: &str) -> u32 {
    paths::filename_stamp(name)
        .and_then(|stamp| name.split_once(stamp))
        .and_then(|(_, rest)| rest.strip_suffix(".md"))
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

pub fn latest(root: &Path) -> Result<ArchivedDocument> {
    list(root)?
        .into_iter()
        .next()
        .ok_or_else(|| HandoffError::NoDocuments(paths::handoffs_dir(root).display().to_string()))
}

/// Resolve a user-supplied document reference: an existing path, or a bare
/// filename inside the handoffs directory. `None` picks the latest document.
pub fn resolve(root: &Path, reference: Option<&str>) -> Result<PathBuf> {
    let Some(reference) = reference else {
        return Ok(latest(root)?.path);
    };
    // Relative references name files under the root before the cwd.
    let direct = PathBuf::from(reference);
    let candidates = [
        root.join(reference),
        paths::handoffs_dir(root).join(reference),
        direct,
    ];
    candidates
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| HandoffError::DocumentNotFound(reference.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str) -> PathBuf {
        let handoffs = paths::handoffs_dir(dir.path());
        std::fs::create_dir_all(&handoffs).unwrap();
        let path = handoffs.join(name);
        std::fs::write(&path, "# AI Continuation Document\n").unwrap();
        path
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list(dir.path()).unwrap().is_empty());
        assert!(matches!(latest(dir.path()), Err(HandoffError::NoDocuments(_))));
    }

    #[test]
    fn sorted_by_embedded_timestamp() {
        let dir = TempDir::new().unwrap();
        write(&dir, "AI_Continuation_Document-02Jan2026-0900.md");
        write(&dir, "AI_Continuation_Document-19Oct2026-1405.md");
        write(&dir, "AI_Continuation_Document-01Mar2026-2359.md");
        write(&dir, "notes.md");

        let names: Vec<String> = list(dir.path()).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            [
                "AI_Continuation_Document-19Oct2026-1405.md",
                "AI_Continuation_Document-01Mar2026-2359.md",
                "AI_Continuation_Document-02Jan2026-0900.md",
            ]
        );
    }

    #[test]
    fn same_minute_suffix_sorts_newer() {
        let dir = TempDir::new().unwrap();
        write(&dir, "AI_Continuation_Document-19Oct2026-1405-2.md");
        write(&dir, "AI_Continuation_Document-19Oct2026-1405.md");
        let docs = list(dir.path()).unwrap();
        assert_eq!(docs[0].name, "AI_Continuation_Document-19Oct2026-1405-2.md");
    }

    #[test]
    fn latest_and_resolve() {
        let dir = TempDir::new().unwrap();
        write(&dir, "AI_Continuation_Document-02Jan2026-0900.md");
        let newest = write(&dir, "AI_Continuation_Document-19Oct2026-1405.md");

        assert_eq!(latest(dir.path()).unwrap().path, newest);
        assert_eq!(resolve(dir.path(), None).unwrap(), newest);
        assert_eq!(
            resolve(dir.path(), Some("AI_Continuation_Document-19Oct2026-1405.md")).unwrap(),
            newest
        );
        assert_eq!(
            resolve(
                dir.path(),
                Some("docs/handoffs/AI_Continuation_Document-19Oct2026-1405.md")
            )
            .unwrap(),
            newest
        );
        assert!(matches!(
            resolve(dir.path(), Some("missing.md")),
            Err(HandoffError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn resolve_prefers_root_over_cwd() {
        // Tests run from the crate directory, which has its own Cargo.toml.
        assert!(Path::new("Cargo.toml").is_file());
        let dir = TempDir::new().unwrap();
        let in_root = dir.path().join("Cargo.toml");
        std::fs::write(&in_root, "[package]\n").unwrap();
        assert_eq!(resolve(dir.path(), Some("Cargo.toml")).unwrap(), in_root);
    }

    #[test]
    fn resolve_falls_back_to_cwd() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            resolve(dir.path(), Some("Cargo.toml")).unwrap(),
            PathBuf::from("Cargo.toml")
        );
    }
}
