//! The handoff workflow: resolve the mode, write the continuation document,
//! then clear the session and deliver the resume prompt.
//!
//! ```text
//! Idle -> ModeResolved -> DocumentGenerated -> Persisted -> ContextCleared -> ResumeDelivered
//! ```
//!
//! Nothing is retried. A failure at any step returns before the session is
//! cleared, so context is only ever dropped once a document is on disk.

use crate::config::PreferenceStore;
use crate::delivery::{Clipboard, SessionHost};
use crate::error::{HandoffError, Result};
use crate::generator;
use crate::resume::{build_resume_prompt, normalize_directive};
use crate::session::SessionContext;
use crate::types::{ContinuationMethod, HandoffMode};
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// What the user typed: a free-text directive plus optional mode flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub directive: Option<String>,
    pub mode_override: Option<HandoffMode>,
}

impl Invocation {
    /// Split raw arguments into flags and directive words. Flags may appear
    /// anywhere; when several are given the last one wins. Everything after
    /// a bare `--` is directive text.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = Vec::new();
        let mut mode_override = None;
        let mut literal = false;
        for arg in args {
            let arg = arg.as_ref();
            if literal {
                words.push(arg.to_string());
            } else if arg == "--" {
                literal = true;
            } else if let Some(mode) = HandoffMode::from_flag(arg) {
                mode_override = Some(mode);
            } else if arg.starts_with("--") {
                return Err(HandoffError::UnknownFlag(arg.to_string()));
            } else {
                words.push(arg.to_string());
            }
        }
        let directive = words.join(" ");
        Ok(Self {
            directive: normalize_directive(Some(&directive)).map(str::to_string),
            mode_override,
        })
    }

    /// Apply a flag parsed ahead of the free-text arguments. Flags found
    /// among the arguments came later and keep precedence.
    pub fn with_earlier_flag(mut self, flag: Option<HandoffMode>) -> Self {
        self.mode_override = self.mode_override.or(flag);
        self
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    ModeResolved,
    DocumentGenerated,
    Persisted,
    ContextCleared,
    ResumeDelivered,
}

impl WorkflowState {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::ModeResolved => "mode_resolved",
            WorkflowState::DocumentGenerated => "document_generated",
            WorkflowState::Persisted => "persisted",
            WorkflowState::ContextCleared => "context_cleared",
            WorkflowState::ResumeDelivered => "resume_delivered",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asks the one first-run question.
pub trait MethodPrompt {
    /// Offer Compact or Handoff. `Ok(None)` means the user declined to answer.
    fn choose_method(&mut self) -> Result<Option<ContinuationMethod>>;
}

/// Method and delivery channel for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMode {
    pub method: ContinuationMethod,
    pub delivery: HandoffMode,
    /// The first-run question was asked during this invocation.
    pub asked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub document: PathBuf,
    pub resume_prompt: String,
    pub mode: HandoffMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The user did not answer the first-run question. Nothing was written.
    Declined,
    /// Handed over to the host's own summarisation. No document.
    Compacted,
    Delivered(Delivered),
}

pub struct Workflow<'a> {
    root: &'a Path,
    store: &'a PreferenceStore,
    state: WorkflowState,
    trail: Vec<WorkflowState>,
}

impl<'a> Workflow<'a> {
    pub fn new(root: &'a Path, store: &'a PreferenceStore) -> Self {
        Self {
            root,
            store,
            state: WorkflowState::Idle,
            trail: vec![WorkflowState::Idle],
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn trail(&self) -> &[WorkflowState] {
        &self.trail
    }

    fn advance(&mut self, next: WorkflowState) {
        tracing::debug!(from = %self.state, to = %next, "handoff transition");
        self.state = next;
        self.trail.push(next);
    }

    // -----------------------------------------------------------------------
    // Trigger handling
    // -----------------------------------------------------------------------

    /// Decide method and delivery. `Ok(None)` when the user declined the
    /// first-run question; the workflow then stays `Idle`.
    pub fn resolve_mode(
        &mut self,
        invocation: &Invocation,
        prompt: &mut dyn MethodPrompt,
    ) -> Result<Option<ResolvedMode>> {
        let stored = match self.store.load() {
            Ok(loaded) => Some(loaded.preferences),
            Err(e) => {
                tracing::warn!(error = %e, "preference store unreadable, using defaults");
                None
            }
        };
        let prefs = stored.clone().unwrap_or_default();

        let mut asked = false;
        let method = match prefs.method() {
            ContinuationMethod::Compact => ContinuationMethod::Compact,
            ContinuationMethod::Handoff => ContinuationMethod::Handoff,
            ContinuationMethod::Ask if stored.is_none() => ContinuationMethod::Handoff,
            ContinuationMethod::Ask => {
                asked = true;
                let Some(choice) = prompt.choose_method()? else {
                    tracing::debug!("method question declined; staying idle");
                    return Ok(None);
                };
                let choice = match choice {
                    ContinuationMethod::Ask => ContinuationMethod::Handoff,
                    other => other,
                };
                let scope = self.store.default_write_scope();
                if let Err(e) = self.store.set_method(scope, choice) {
                    tracing::warn!(error = %e, "could not persist continuation method; using it for this run only");
                }
                choice
            }
        };

        let delivery = invocation.mode_override.unwrap_or(prefs.mode());
        let resolved = ResolvedMode {
            method,
            delivery,
            asked,
        };
        self.advance(WorkflowState::ModeResolved);
        Ok(Some(resolved))
    }

    // -----------------------------------------------------------------------
    // Full run
    // -----------------------------------------------------------------------

    pub fn run(
        &mut self,
        invocation: &Invocation,
        session: &dyn SessionContext,
        now: NaiveDateTime,
        prompt: &mut dyn MethodPrompt,
        clipboard: &mut dyn Clipboard,
        host: &mut dyn SessionHost,
    ) -> Result<Outcome> {
        let Some(mode) = self.resolve_mode(invocation, prompt)? else {
            return Ok(Outcome::Declined);
        };

        if mode.method == ContinuationMethod::Compact {
            host.compact()?;
            self.advance(WorkflowState::Idle);
            return Ok(Outcome::Compacted);
        }

        let directive = normalize_directive(invocation.directive.as_deref());
        let doc = generator::generate(session, directive, now);
        self.advance(WorkflowState::DocumentGenerated);

        let path = doc.persist(self.root)?;
        self.advance(WorkflowState::Persisted);
        tracing::info!(path = %path.display(), "continuation document saved");

        let resume_prompt = self.deliver(&path, directive, mode.delivery, clipboard, host)?;
        Ok(Outcome::Delivered(Delivered {
            document: path,
            resume_prompt,
            mode: mode.delivery,
        }))
    }

    /// Re-deliver a resume prompt for a document that is already on disk.
    pub fn resume(
        &mut self,
        document: &Path,
        invocation: &Invocation,
        clipboard: &mut dyn Clipboard,
        host: &mut dyn SessionHost,
    ) -> Result<Delivered> {
        if !document.is_file() {
            return Err(HandoffError::DocumentNotFound(document.display().to_string()));
        }
        let stored_mode = match self.store.load() {
            Ok(loaded) => loaded.preferences.mode(),
            Err(e) => {
                tracing::warn!(error = %e, "preference store unreadable, using defaults");
                HandoffMode::default()
            }
        };
        let mode = invocation.mode_override.unwrap_or(stored_mode);
        self.advance(WorkflowState::ModeResolved);
        self.advance(WorkflowState::Persisted);

        let directive = normalize_directive(invocation.directive.as_deref());
        let resume_prompt = self.deliver(document, directive, mode, clipboard, host)?;
        Ok(Delivered {
            document: document.to_path_buf(),
            resume_prompt,
            mode,
        })
    }

    /// Build the resume prompt and hand it off. Clipboard mode copies before
    /// clearing so a failed copy leaves the session intact; auto-paste clears
    /// before submitting so nothing from the old session leaks into the new one.
    fn deliver(
        &mut self,
        document: &Path,
        directive: Option<&str>,
        mode: HandoffMode,
        clipboard: &mut dyn Clipboard,
        host: &mut dyn SessionHost,
    ) -> Result<String> {
        let shown = document.strip_prefix(self.root).unwrap_or(document);
        let prompt = build_resume_prompt(&shown.display().to_string(), directive);

        match mode {
            HandoffMode::Clipboard => {
                clipboard.copy(&prompt)?;
                host.clear_context()?;
                self.advance(WorkflowState::ContextCleared);
            }
            HandoffMode::AutoPaste => {
                host.clear_context()?;
                self.advance(WorkflowState::ContextCleared);
                host.submit(&prompt)?;
            }
        }
        self.advance(WorkflowState::ResumeDelivered);
        Ok(prompt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
