use handoff_core::delivery::{Clipboard, CommandClipboard, CommandSession, SessionHost};
use handoff_core::Result;

/// The assistant session as seen from a terminal. With a configured
/// `sessionCommand` the fresh session is started directly; otherwise the
/// user is told what to run and the prompt is written to stdout (unless
/// the caller reports it some other way, as `--json` does).
pub struct TerminalHost {
    session: Option<CommandSession>,
    print_prompt: bool,
}

impl TerminalHost {
    pub fn new(session_command: Option<Vec<String>>, print_prompt: bool) -> Result<Self> {
        let session = session_command.map(CommandSession::new).transpose()?;
        Ok(Self {
            session,
            print_prompt,
        })
    }
}

impl SessionHost for TerminalHost {
    fn compact(&mut self) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.compact(),
            None => {
                eprintln!("Continuation method is compact: run /compact in your session.");
                Ok(())
            }
        }
    }

    fn clear_context(&mut self) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.clear_context(),
            None => {
                eprintln!("Context can be cleared now: run /clear in your session.");
                Ok(())
            }
        }
    }

    fn submit(&mut self, prompt: &str) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.submit(prompt),
            None => {
                if self.print_prompt {
                    print!("{prompt}");
                }
                Ok(())
            }
        }
    }
}

/// Resolves the clipboard tool on first use, so runs that never copy do
/// not fail when no tool is installed.
pub struct LazyClipboard {
    configured: Option<Vec<String>>,
}

impl LazyClipboard {
    pub fn new(configured: Option<Vec<String>>) -> Self {
        Self { configured }
    }
}

impl Clipboard for LazyClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        CommandClipboard::resolve(self.configured.as_deref())?.copy(text)
    }
}
