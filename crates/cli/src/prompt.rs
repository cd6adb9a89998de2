//! Terminal implementations of the prompt and alert collaborators.

use std::io::{self, BufRead, Write};

use gridfeed_core::{Alert, CodePrompt};

const PROMPT_TEXT: &str = "Dataset code (SOURCE/TABLE, empty to cancel): ";
const RETRY_TEXT: &str = "Not a dataset code. Expected SOURCE/TABLE, e.g. WIKI/AAPL.";

/// Reads dataset codes line by line. Questions go to `output`, answers come
/// from `input`. An empty line or end of input cancels; any other answer,
/// blanks included, is handed back for validation.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    asked: usize,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, asked: 0 }
    }
}

impl<R: BufRead, W: Write> CodePrompt for TerminalPrompt<R, W> {
    fn prompt_for_code(&mut self) -> Option<String> {
        // Every prompt after the first follows a rejected answer
        if self.asked > 0 {
            let _ = writeln!(self.output, "{}", RETRY_TEXT);
        }
        self.asked += 1;

        let _ = write!(self.output, "{}", PROMPT_TEXT);
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim_end_matches(['\r', '\n']);
                if answer.is_empty() {
                    None
                } else {
                    Some(answer.to_string())
                }
            }
            Err(e) => {
                log::warn!("cannot read dataset code: {}", e);
                None
            }
        }
    }
}

/// Prompt used with `--no-prompt`: every question is cancelled.
pub struct NoPrompt;

impl CodePrompt for NoPrompt {
    fn prompt_for_code(&mut self) -> Option<String> {
        None
    }
}

/// Writes alerts to stderr.
pub struct StderrAlert;

impl Alert for StderrAlert {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridfeed_core::SelectionContents;

    fn prompt(input: &str) -> TerminalPrompt<&[u8], Vec<u8>> {
        TerminalPrompt::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn test_reads_one_line_per_prompt() {
        let mut p = prompt("bad\nWIKI/AAPL\n");
        assert_eq!(p.prompt_for_code().as_deref(), Some("bad"));
        assert_eq!(p.prompt_for_code().as_deref(), Some("WIKI/AAPL"));

        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches(PROMPT_TEXT).count(), 2);
        assert_eq!(shown.matches(RETRY_TEXT).count(), 1);
    }

    #[test]
    fn test_empty_line_cancels() {
        let mut p = prompt("\nWIKI/AAPL\n");
        assert_eq!(p.prompt_for_code(), None);
    }

    #[test]
    fn test_whitespace_answer_is_returned() {
        let mut p = prompt("  \nWIKI/AAPL\n");
        assert_eq!(p.prompt_for_code().as_deref(), Some("  "));
        assert_eq!(p.prompt_for_code().as_deref(), Some("WIKI/AAPL"));
    }

    #[test]
    fn test_whitespace_answer_prompts_again() {
        let mut p = prompt("  \nWIKI/AAPL\n");
        let outcome = gridfeed_core::resolve(&SelectionContents::default(), &mut p);
        assert_eq!(outcome.identifier().map(|id| id.normalized()), Some("WIKI/AAPL"));
        assert_eq!(String::from_utf8(p.output).unwrap().matches(PROMPT_TEXT).count(), 2);
    }

    #[test]
    fn test_eof_cancels() {
        let mut p = prompt("");
        assert_eq!(p.prompt_for_code(), None);
    }

    #[test]
    fn test_crlf_is_stripped_but_inner_spaces_kept() {
        let mut p = prompt("AAA/ BBB \r\n");
        assert_eq!(p.prompt_for_code().as_deref(), Some("AAA/ BBB "));
    }

    #[test]
    fn test_no_prompt_always_cancels() {
        assert_eq!(NoPrompt.prompt_for_code(), None);
    }
}
