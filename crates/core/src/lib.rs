//! Core types shared by the importer: the selection snapshot, the dataset
//! code validator and the resolver that turns a selection into a code.
//!
//! No I/O here. Prompting and alerting are injected through [`CodePrompt`]
//! and [`Alert`] so the resolution loop runs without a terminal.

pub mod identifier;
pub mod resolve;
pub mod selection;

pub use identifier::{is_valid, DatasetIdentifier, SEPARATOR};
pub use resolve::{infer_candidate, resolve, Alert, CodePrompt, ResolutionOutcome};
pub use selection::{CellValue, SelectionContents};
