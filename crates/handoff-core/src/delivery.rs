//! Channels that carry the resume prompt out of the current session.
//!
//! Two seams: [`Clipboard`] for manual pasting and [`SessionHost`] for the
//! assistant session itself (compact, clear, submit). Both are traits so the
//! workflow can be driven against in-memory fakes.

use crate::error::{HandoffError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

pub trait SessionHost {
    /// Hand over to the host's built-in summarisation instead of a handoff.
    fn compact(&mut self) -> Result<()>;

    /// Drop the current session's context.
    fn clear_context(&mut self) -> Result<()>;

    /// Submit `prompt` as the first message of the (fresh) session.
    fn submit(&mut self, prompt: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Command-backed clipboard
// ---------------------------------------------------------------------------

/// Clipboard writes that pipe text into an external program's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClipboard {
    argv: Vec<String>,
}

/// Known clipboard tools, in probe order.
const CLIPBOARD_TOOLS: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
    &["clip.exe"],
];

impl CommandClipboard {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(HandoffError::ClipboardUnavailable);
        }
        Ok(Self { argv })
    }

    /// First clipboard tool found on `PATH`.
    pub fn detect() -> Option<Self> {
        CLIPBOARD_TOOLS
            .iter()
            .find(|argv| which::which(argv[0]).is_ok())
            .map(|argv| Self {
                argv: argv.iter().map(|s| s.to_string()).collect(),
            })
    }

    /// A configured command wins over detection.
    pub fn resolve(configured: Option<&[String]>) -> Result<Self> {
        match configured {
            Some(argv) => Self::new(argv.to_vec()),
            None => Self::detect().ok_or(HandoffError::ClipboardUnavailable),
        }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }
}

impl Clipboard for CommandClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HandoffError::ClipboardFailed(format!("{}: {e}", self.argv[0])))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| HandoffError::ClipboardFailed(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| HandoffError::ClipboardFailed(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HandoffError::ClipboardFailed(format!(
                "{} exited with {}: {}",
                self.argv[0],
                output.status,
                stderr.trim()
            )));
        }
        tracing::debug!(program = %self.argv[0], bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Command-backed session
// ---------------------------------------------------------------------------

/// Start a fresh assistant process with the prompt as its final argument.
/// Starting a new process is what clears the context, so `clear_context`
/// only records that the old session is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSession {
    argv: Vec<String>,
    cleared: bool,
}

impl CommandSession {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(HandoffError::SessionFailed("empty session command".into()));
        }
        Ok(Self {
            argv,
            cleared: false,
        })
    }

    pub fn command_line(&self, prompt: &str) -> Vec<String> {
        let mut argv = self.argv.clone();
        argv.push(prompt.to_string());
        argv
    }
}

impl SessionHost for CommandSession {
    fn compact(&mut self) -> Result<()> {
        let status = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .arg("/compact")
            .status()
            .map_err(|e| HandoffError::SessionFailed(format!("{}: {e}", self.argv[0])))?;
        if !status.success() {
            return Err(HandoffError::SessionFailed(format!(
                "{} exited with {status}",
                self.argv[0]
            )));
        }
        Ok(())
    }

    fn clear_context(&mut self) -> Result<()> {
        self.cleared = true;
        Ok(())
    }

    fn submit(&mut self, prompt: &str) -> Result<()> {
        if !self.cleared {
            return Err(HandoffError::SessionFailed(
                "refusing to submit before the previous context was cleared".into(),
            ));
        }
        let argv = self.command_line(prompt);
        tracing::debug!(program = %argv[0], "starting fresh session");
        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .status()
            .map_err(|e| HandoffError::SessionFailed(format!("{}: {e}", argv[0])))?;
        if !status.success() {
            return Err(HandoffError::SessionFailed(format!(
                "{} exited with {status}",
                argv[0]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_argv_is_rejected() {
        assert!(CommandClipboard::new(vec![]).is_err());
        assert!(CommandSession::new(vec![]).is_err());
    }

    #[test]
    fn configured_clipboard_wins() {
        let argv = vec!["my-copy".to_string(), "--quiet".to_string()];
        let clip = CommandClipboard::resolve(Some(&argv)).unwrap();
        assert_eq!(clip.program(), "my-copy");
    }

    #[cfg(unix)]
    #[test]
    fn command_clipboard_pipes_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("clip.txt");
        let mut clip = CommandClipboard::new(vec![
            "sh".into(),
            "-c".into(),
            format!("cat > '{}'", out.display()),
        ])
        .unwrap();
        clip.copy("resume here").unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "resume here");
    }

    #[cfg(unix)]
    #[test]
    fn failing_clipboard_reports_error() {
        let mut clip = CommandClipboard::new(vec!["sh".into(), "-c".into(), "exit 3".into()])
            .unwrap();
        let err = clip.copy("x").unwrap_err();
        assert!(matches!(err, HandoffError::ClipboardFailed(_)));
    }

    #[test]
    fn session_refuses_submit_before_clear() {
        let mut session = CommandSession::new(vec!["true".into()]).unwrap();
        let err = session.submit("prompt").unwrap_err();
        assert!(matches!(err, HandoffError::SessionFailed(_)));
    }

    #[test]
    fn session_appends_prompt() {
        let session = CommandSession::new(vec!["claude".into()]).unwrap();
        assert_eq!(session.command_line("read the doc"), ["claude", "read the doc"]);
    }
}
