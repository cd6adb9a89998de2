//! Turn a selection snapshot into a dataset code, asking the user when the
//! selection does not already hold one.

use crate::identifier::{DatasetIdentifier, SEPARATOR};
use crate::selection::SelectionContents;

/// Something that can ask the user for a line of text.
///
/// Returns `None` when the user cancels or confirms an empty field.
pub trait CodePrompt {
    fn prompt_for_code(&mut self) -> Option<String>;
}

impl<F> CodePrompt for F
where
    F: FnMut() -> Option<String>,
{
    fn prompt_for_code(&mut self) -> Option<String> {
        self()
    }
}

/// Something that can show the user a message.
pub trait Alert {
    fn alert(&mut self, message: &str);
}

/// Result of resolving a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(DatasetIdentifier),
    Cancelled,
}

impl ResolutionOutcome {
    pub fn identifier(&self) -> Option<&DatasetIdentifier> {
        match self {
            ResolutionOutcome::Resolved(id) => Some(id),
            ResolutionOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolutionOutcome::Cancelled)
    }
}

/// Guess a dataset code from the selection without prompting.
///
/// Only single-row selections are considered: one cell holds the whole
/// code, two adjacent cells hold source and table. Every other shape
/// yields `None`.
pub fn infer_candidate(selection: &SelectionContents) -> Option<String> {
    let row = selection.single_row()?;
    match row {
        [code] => Some(code.as_text()),
        [source, table] => Some(format!("{}{}{}", source.as_text(), SEPARATOR, table.as_text())),
        _ => None,
    }
}

/// Resolve `selection` to a valid dataset code.
///
/// Prompts until the user supplies a valid code or cancels. There is no
/// retry limit.
pub fn resolve(selection: &SelectionContents, prompt: &mut dyn CodePrompt) -> ResolutionOutcome {
    let mut candidate = infer_candidate(selection);
    if let Some(ref c) = candidate {
        log::debug!("inferred dataset code {:?} from selection", c);
    }

    loop {
        if let Some(id) = candidate.as_deref().and_then(DatasetIdentifier::parse) {
            return ResolutionOutcome::Resolved(id);
        }
        if candidate.is_some() {
            log::debug!("dataset code {:?} is not SOURCE/TABLE", candidate);
        }

        match prompt.prompt_for_code() {
            Some(answer) if !answer.is_empty() => {
                log::debug!("prompted dataset code {:?}", answer);
                candidate = Some(answer);
            }
            _ => {
                log::debug!("dataset code prompt cancelled");
                return ResolutionOutcome::Cancelled;
            }
        }
    }
}
