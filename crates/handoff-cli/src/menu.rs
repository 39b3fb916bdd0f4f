use handoff_core::types::ContinuationMethod;
use handoff_core::workflow::MethodPrompt;
use std::io::{self, BufRead, Write};

/// Numbered menus read line by line. Prompts go to `output` (stderr in the
/// binary) so stdout stays clean for the resume prompt.
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl Menu<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Menu::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Zero-based index of the chosen option. `None` when the user enters
    /// nothing, `q`, or closes the input. Out-of-range answers ask again.
    pub fn choose(&mut self, title: &str, options: &[&str]) -> io::Result<Option<usize>> {
        writeln!(self.output)?;
        writeln!(self.output, "{title}")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {option}", i + 1)?;
        }
        loop {
            write!(self.output, "Enter choice (number, q to cancel): ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }
            let answer = line.trim();
            if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Please enter a number from 1 to {}.", options.len())?,
            }
        }
    }
}

pub const METHOD_OPTIONS: &[&str] = &[
    "Compact  - built-in context summarization (faster, less detail)",
    "Handoff  - write an eight-section continuation document",
];

impl<R: BufRead, W: Write> MethodPrompt for Menu<R, W> {
    fn choose_method(&mut self) -> handoff_core::Result<Option<ContinuationMethod>> {
        let choice = self.choose(
            "How should context be continued? (asked once, then remembered)",
            METHOD_OPTIONS,
        )?;
        Ok(choice.map(|i| {
            if i == 0 {
                ContinuationMethod::Compact
            } else {
                ContinuationMethod::Handoff
            }
        }))
    }
}
