#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn handoff(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("handoff").unwrap();
    cmd.current_dir(dir.path())
        .env("HANDOFF_ROOT", dir.path())
        .env("HOME", dir.path().join("home"))
        .env_remove("RUST_LOG");
    cmd
}

fn project_config(dir: &TempDir) -> PathBuf {
    dir.path().join(".claude/skills/handoff-prompt/config.json")
}

fn global_config(dir: &TempDir) -> PathBuf {
    dir.path().join("home/.claude/skills/handoff-prompt/config.json")
}

fn write_file(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Project config choosing handoff, with the clipboard captured to clip.txt.
fn configure_handoff(dir: &TempDir) {
    write_file(
        &project_config(dir),
        r#"{
  "continuationMethod": "handoff",
  "handoffMode": "clipboard",
  "clipboardCommand": ["sh", "-c", "cat > clip.txt"]
}"#,
    );
}

fn documents(dir: &TempDir) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir.path().join("docs/handoffs")) else {
        return Vec::new();
    };
    let mut docs: Vec<PathBuf> = entries.map(|e| e.unwrap().path()).collect();
    docs.sort();
    docs
}

fn section_headers(text: &str) -> Vec<&str> {
    text.lines().filter_map(|l| l.strip_prefix("## ")).collect()
}

const TITLES: [&str; 8] = [
    "Project Identity",
    "Current System State",
    "Architecture & Technical Map",
    "Recent Work",
    "What Could Go Wrong",
    "How to Think About This Project",
    "Do Not Touch List",
    "Confidence & Freshness",
];

// ---------------------------------------------------------------------------
// handoff run
// ---------------------------------------------------------------------------

#[test]
fn run_auto_prints_prompt_with_directive() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir)
        .args(["run", "--auto", "continue", "testing", "the", "billing", "system"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "--- USER DIRECTIVE ---\ncontinue testing the billing system\n--- END USER DIRECTIVE ---",
        ))
        .stdout(predicate::str::contains("docs/handoffs/AI_Continuation_Document-"))
        .stderr(predicate::str::contains("Saved docs/handoffs/"));

    let docs = documents(&dir);
    assert_eq!(docs.len(), 1);
    let name = docs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("AI_Continuation_Document-"));
    assert!(name.ends_with(".md"));
    let text = std::fs::read_to_string(&docs[0]).unwrap();
    assert_eq!(section_headers(&text), TITLES);
    assert!(!dir.path().join("clip.txt").exists());
}

#[cfg(unix)]
#[test]
fn run_clipboard_copies_prompt() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir)
        .args(["run", "fix", "the", "refund", "path"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("copied to the clipboard"));

    let clip = std::fs::read_to_string(dir.path().join("clip.txt")).unwrap();
    assert!(clip.contains("--- USER DIRECTIVE ---\nfix the refund path\n--- END USER DIRECTIVE ---"));
    assert_eq!(documents(&dir).len(), 1);
}

#[cfg(unix)]
#[test]
fn run_without_directive_asks_for_proposal() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir).arg("run").assert().success();

    let clip = std::fs::read_to_string(dir.path().join("clip.txt")).unwrap();
    assert!(clip.contains("--- USER DIRECTIVE ---\n--- END USER DIRECTIVE ---"));
    assert!(clip.contains("propose the single most sensible next action"));
}

#[cfg(unix)]
#[test]
fn last_mode_flag_wins() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir)
        .args(["run", "--auto", "go", "--clipboard"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(dir.path().join("clip.txt").exists());

    handoff(&dir)
        .args(["run", "--clipboard", "go", "--auto-paste"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- USER DIRECTIVE ---\ngo\n"));
}

#[test]
fn mode_flag_does_not_change_stored_mode() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir).args(["run", "--auto"]).assert().success();

    let raw = std::fs::read_to_string(project_config(&dir)).unwrap();
    assert!(raw.contains(r#""handoffMode": "clipboard""#));
}

#[cfg(unix)]
#[test]
fn words_after_separator_stay_literal() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir)
        .args(["run", "--", "explain", "--auto"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let clip = std::fs::read_to_string(dir.path().join("clip.txt")).unwrap();
    assert!(clip.contains("--- USER DIRECTIVE ---\nexplain --auto\n--- END USER DIRECTIVE ---"));
}

#[test]
fn unknown_flag_writes_nothing() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir)
        .args(["run", "go", "--fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown flag '--fast'"));
    assert!(documents(&dir).is_empty());
}

#[test]
fn first_run_compact_is_remembered() {
    let dir = TempDir::new().unwrap();

    handoff(&dir)
        .arg("run")
        .write_stdin("1\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("run /compact"));

    assert!(documents(&dir).is_empty());
    let raw = std::fs::read_to_string(global_config(&dir)).unwrap();
    assert!(raw.contains(r#""continuationMethod": "compact""#));

    // No question the second time: empty stdin would otherwise decline.
    handoff(&dir)
        .arg("run")
        .assert()
        .success()
        .stderr(predicate::str::contains("run /compact"));
}

#[test]
fn first_run_handoff_writes_document() {
    let dir = TempDir::new().unwrap();

    handoff(&dir)
        .args(["run", "--auto", "carry", "on"])
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("carry on"));

    assert_eq!(documents(&dir).len(), 1);
    let raw = std::fs::read_to_string(global_config(&dir)).unwrap();
    assert!(raw.contains(r#""continuationMethod": "handoff""#));
}

#[test]
fn declined_question_writes_nothing() {
    let dir = TempDir::new().unwrap();

    handoff(&dir)
        .arg("run")
        .write_stdin("q\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing was written"));

    assert!(documents(&dir).is_empty());
    assert!(!global_config(&dir).exists());
    assert!(!project_config(&dir).exists());
}

#[test]
fn unreadable_store_does_not_ask() {
    let dir = TempDir::new().unwrap();
    write_file(&global_config(&dir), "{{{ not json");

    handoff(&dir)
        .args(["run", "--auto", "resume work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resume work"))
        .stderr(predicate::str::contains("preference store unreadable"));
    assert_eq!(documents(&dir).len(), 1);
}

#[test]
fn persist_failure_keeps_context() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);
    std::fs::write(dir.path().join("docs"), "not a directory").unwrap();

    handoff(&dir)
        .args(["run", "--auto", "go"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("context was not cleared"));
}

#[test]
fn same_minute_runs_keep_both_documents() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir).args(["run", "--auto", "first"]).assert().success();
    handoff(&dir).args(["run", "--auto", "second"]).assert().success();

    let docs = documents(&dir);
    assert_eq!(docs.len(), 2);
    let texts: Vec<String> = docs
        .iter()
        .map(|d| std::fs::read_to_string(d).unwrap())
        .collect();
    assert!(texts.iter().any(|t| t.contains("**Next directive:** first")));
    assert!(texts.iter().any(|t| t.contains("**Next directive:** second")));
}

#[test]
fn run_builds_document_from_session_snapshot() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);
    write_file(
        &dir.path().join("session.json"),
        r#"{
  "project": "billing-service",
  "entries": [
    {"at": "2026-10-19T13:00:00Z", "section": "current_state", "label": "Working",
     "text": "invoice export", "verified": true},
    {"at": "2026-10-19T13:40:00Z", "section": "recent_work", "label": "What Changed",
     "text": "added webhook retries", "verified": true},
    {"at": "2026-10-19T13:41:00Z", "section": "what_could_go_wrong", "label": "Assumptions",
     "text": "rates are cached", "speculative": true}
  ]
}"#,
    );

    handoff(&dir)
        .args(["run", "--auto", "--session", "session.json", "ship", "it"])
        .assert()
        .success();

    let text = std::fs::read_to_string(&documents(&dir)[0]).unwrap();
    assert!(text.contains("**Project:** billing-service"));
    assert!(text.contains("- added webhook retries"));
    assert!(text.contains("- (speculative) rates are cached"));
    assert!(text.contains("- Recent Work: HIGH"));
}

#[test]
fn run_json_reports_outcome() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    let out = handoff(&dir)
        .args(["--json", "run", "--auto", "next"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["outcome"], "delivered");
    assert_eq!(value["mode"], "auto-paste");
    assert_eq!(value["directive"], "next");
    assert!(value["document"]
        .as_str()
        .unwrap()
        .starts_with("docs/handoffs/AI_Continuation_Document-"));
}

// ---------------------------------------------------------------------------
// Archive commands
// ---------------------------------------------------------------------------

#[test]
fn list_show_and_resume() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);

    handoff(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No continuation documents"));

    handoff(&dir).args(["run", "--auto"]).assert().success();

    handoff(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("AI_Continuation_Document-"));

    handoff(&dir)
        .args(["show", "--latest"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# AI Continuation Document"));

    handoff(&dir)
        .args(["resume", "--auto", "pick", "up", "refunds"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- USER DIRECTIVE ---\npick up refunds\n"));

    // resume never writes a new document
    assert_eq!(documents(&dir).len(), 1);
}

#[test]
fn show_latest_picks_newest() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);
    handoff(&dir).args(["run", "--auto", "first"]).assert().success();
    handoff(&dir).args(["run", "--auto", "second"]).assert().success();

    handoff(&dir)
        .args(["show", "--latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**Next directive:** second"));
}

#[test]
fn show_missing_document_fails() {
    let dir = TempDir::new().unwrap();
    handoff(&dir)
        .args(["show", "nope.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("document not found"));
}

#[test]
fn template_has_all_sections() {
    let dir = TempDir::new().unwrap();
    let out = handoff(&dir).arg("template").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert_eq!(section_headers(&text), TITLES);
    assert!(documents(&dir).is_empty());
}

// ---------------------------------------------------------------------------
// handoff config
// ---------------------------------------------------------------------------

#[test]
fn config_set_show_reset() {
    let dir = TempDir::new().unwrap();

    handoff(&dir)
        .args(["config", "set", "--method", "handoff", "--mode", "auto-paste", "--scope", "project"])
        .assert()
        .success();

    let out = handoff(&dir)
        .args(["--json", "config", "show"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["effective"]["continuationMethod"], "handoff");
    assert_eq!(value["effective"]["handoffMode"], "auto-paste");
    assert_eq!(value["project"]["exists"], true);
    assert_eq!(value["global"]["exists"], false);

    handoff(&dir)
        .args(["config", "reset", "--scope", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed project config"));
    assert!(!project_config(&dir).exists());
}

#[test]
fn config_set_rejects_bad_value() {
    let dir = TempDir::new().unwrap();
    handoff(&dir)
        .args(["config", "set", "--mode", "fax"])
        .assert()
        .failure();
}

#[test]
fn config_wizard_from_stdin() {
    let dir = TempDir::new().unwrap();
    handoff(&dir)
        .args(["config", "wizard"])
        .write_stdin("2\n1\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("continuationMethod: handoff"));

    let raw = std::fs::read_to_string(project_config(&dir)).unwrap();
    assert!(raw.contains(r#""handoffMode": "clipboard""#));
}

// ---------------------------------------------------------------------------
// handoff analytics
// ---------------------------------------------------------------------------

#[test]
fn analytics_without_documents_fails() {
    let dir = TempDir::new().unwrap();
    handoff(&dir)
        .arg("analytics")
        .assert()
        .failure()
        .stderr(predicate::str::contains("create one with: handoff run"));
}

#[test]
fn analytics_views_and_exports() {
    let dir = TempDir::new().unwrap();
    configure_handoff(&dir);
    handoff(&dir).args(["run", "--auto"]).assert().success();

    handoff(&dir)
        .arg("analytics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total handoffs:        1"));

    handoff(&dir)
        .args(["analytics", "confidence"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recent Work:"));

    handoff(&dir)
        .args(["analytics", "--export", "json"])
        .assert()
        .success();
    let raw = std::fs::read_to_string(dir.path().join("handoff-analytics.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["total_documents"], 1);

    let report = dir.path().join("out/report.html");
    handoff(&dir)
        .args(["analytics", "report", "--out"])
        .arg(&report)
        .assert()
        .success();
    assert!(std::fs::read_to_string(&report)
        .unwrap()
        .contains("Handoff Analytics Report"));
}

// ---------------------------------------------------------------------------
// handoff monitor
// ---------------------------------------------------------------------------

#[test]
fn monitor_reports_low_usage() {
    let dir = TempDir::new().unwrap();
    let out = handoff(&dir)
        .args(["--json", "monitor"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["status"], "OK");
    assert_eq!(value["threshold"], 80);
    assert_eq!(value["should_handoff"], false);
}

#[test]
fn monitor_fails_above_threshold() {
    let dir = TempDir::new().unwrap();
    // 680 000 bytes ~ 170 000 tokens = 85%
    write_file(
        &dir.path().join("home/.claude/context/current.json"),
        &"x".repeat(680_000),
    );

    handoff(&dir)
        .arg("monitor")
        .assert()
        .failure()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("handoff run"));

    handoff(&dir)
        .args(["monitor", "--threshold", "90"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Approaching threshold"));
}

#[test]
fn monitor_watch_rejects_json() {
    let dir = TempDir::new().unwrap();
    handoff(&dir)
        .args(["--json", "monitor", "--watch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be combined with --json"));
}

#[test]
fn monitor_install_hook_prints_snippet() {
    let dir = TempDir::new().unwrap();
    handoff(&dir)
        .args(["monitor", "--install-hook", "--threshold", "85"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SessionStart"))
        .stdout(predicate::str::contains("monitor --threshold 85"));
}
