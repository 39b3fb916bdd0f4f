use crate::cmd::run::report;
use crate::host::{LazyClipboard, TerminalHost};
use anyhow::Context;
use handoff_core::{
    archive,
    config::PreferenceStore,
    types::HandoffMode,
    workflow::{Invocation, Workflow},
};
use std::path::Path;

pub fn run(
    root: &Path,
    doc: Option<&str>,
    flag: Option<HandoffMode>,
    words: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let invocation = Invocation::from_args(words)?.with_earlier_flag(flag);
    let document = archive::resolve(root, doc).context("no document to resume from")?;

    let store = PreferenceStore::new(root);
    let prefs = store.load().map(|l| l.preferences).unwrap_or_default();
    let mut clipboard = LazyClipboard::new(prefs.clipboard_command);
    let mut host = TerminalHost::new(prefs.session_command, !json)?;

    let delivered = Workflow::new(root, &store)
        .resume(&document, &invocation, &mut clipboard, &mut host)
        .context("failed to deliver resume prompt")?;
    report(root, &delivered, &invocation, json)
}
