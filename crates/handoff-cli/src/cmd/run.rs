use crate::host::{LazyClipboard, TerminalHost};
use crate::menu::Menu;
use crate::output::print_json;
use anyhow::Context;
use handoff_core::{
    config::PreferenceStore,
    session::SessionSnapshot,
    types::HandoffMode,
    workflow::{Delivered, Invocation, Outcome, Workflow, WorkflowState},
};
use std::path::Path;

pub fn run(
    root: &Path,
    flag: Option<HandoffMode>,
    session: Option<&Path>,
    words: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let invocation = Invocation::from_args(words)?.with_earlier_flag(flag);

    let snapshot = match session {
        Some(path) => SessionSnapshot::load(path)
            .with_context(|| format!("failed to read session snapshot {}", path.display()))?,
        None => SessionSnapshot::default(),
    };

    let store = PreferenceStore::new(root);
    // Unreadable stores are reported by the workflow itself.
    let prefs = store.load().map(|l| l.preferences).unwrap_or_default();
    let mut clipboard = LazyClipboard::new(prefs.clipboard_command);
    let mut host = TerminalHost::new(prefs.session_command, !json)?;
    let mut menu = Menu::stdio();
    let now = chrono::Local::now().naive_local();

    let mut workflow = Workflow::new(root, &store);
    let result = workflow.run(
        &invocation,
        &snapshot,
        now,
        &mut menu,
        &mut clipboard,
        &mut host,
    );

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if workflow.state() == WorkflowState::Persisted => {
            return Err(e).context(
                "continuation document saved, but the resume prompt was not delivered; \
                 context was not cleared (retry with `handoff resume`)",
            );
        }
        Err(e) => {
            return Err(e).context("handoff aborted; context was not cleared");
        }
    };

    match outcome {
        Outcome::Declined => {
            if json {
                print_json(&serde_json::json!({ "outcome": "declined" }))?;
            } else {
                eprintln!("No continuation method chosen. Nothing was written.");
            }
        }
        Outcome::Compacted => {
            if json {
                print_json(&serde_json::json!({ "outcome": "compacted" }))?;
            }
        }
        Outcome::Delivered(delivered) => report(root, &delivered, &invocation, json)?,
    }
    Ok(())
}

/// Summarise a delivered handoff. Shared with `resume`.
pub fn report(
    root: &Path,
    delivered: &Delivered,
    invocation: &Invocation,
    json: bool,
) -> anyhow::Result<()> {
    let shown = delivered
        .document
        .strip_prefix(root)
        .unwrap_or(&delivered.document);
    if json {
        return print_json(&serde_json::json!({
            "outcome": "delivered",
            "document": shown,
            "mode": delivered.mode,
            "directive": invocation.directive,
            "resume_prompt": delivered.resume_prompt,
        }));
    }

    eprintln!("Saved {}", shown.display());
    match delivered.mode {
        HandoffMode::Clipboard => {
            eprintln!("Resume prompt copied to the clipboard. Paste it into the fresh session.")
        }
        HandoffMode::AutoPaste => eprintln!("Resume prompt delivered to the fresh session."),
    }
    Ok(())
}

/// clap consumes a `--` that comes before the first directive word. Put it
/// back when the raw command line shows one, so words after it stay literal.
pub fn restore_separator(raw: &[String], words: Vec<String>) -> Vec<String> {
    let Some(pos) = raw.iter().position(|a| a == "--") else {
        return words;
    };
    if raw[pos + 1..] != words[..] {
        return words;
    }
    let mut restored = Vec::with_capacity(words.len() + 1);
    restored.push("--".to_string());
    restored.extend(words);
    restored
}
