//! Dataset code validation.
//!
//! A dataset code is `SOURCE/TABLE`. Users type them by hand, so before
//! testing a candidate we collapse doubled separators and drop whitespace
//! anywhere in the string. The normalized form is only used for testing and
//! for building request URLs; the caller's text is kept as entered.

use std::fmt;

/// Separator between the source code and the table code.
pub const SEPARATOR: char = '/';

/// Collapse separator runs, then strip every whitespace character.
fn normalize(candidate: &str) -> String {
    let mut collapsed = String::with_capacity(candidate.len());
    let mut prev_sep = false;
    for c in candidate.chars() {
        if c == SEPARATOR {
            if !prev_sep {
                collapsed.push(c);
            }
            prev_sep = true;
        } else {
            collapsed.push(c);
            prev_sep = false;
        }
    }
    collapsed.retain(|c| !c.is_whitespace());
    collapsed
}

/// First two separator-delimited segments of a normalized code.
fn segments(normalized: &str) -> (&str, Option<&str>) {
    let mut parts = normalized.split(SEPARATOR);
    let a = parts.next().unwrap_or("");
    (a, parts.next())
}

/// Returns true if `candidate` names a dataset as `SOURCE/TABLE`.
///
/// Anything after a second separator is ignored.
pub fn is_valid(candidate: Option<&str>) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    if candidate.is_empty() {
        return false;
    }
    let normalized = normalize(candidate);
    match segments(&normalized) {
        (a, Some(b)) => !a.is_empty() && !b.is_empty(),
        _ => false,
    }
}

/// A dataset code that passed [`is_valid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetIdentifier {
    raw: String,
    normalized: String,
}

impl DatasetIdentifier {
    /// Accepts `candidate` only if it is a valid code.
    pub fn parse(candidate: &str) -> Option<Self> {
        if !is_valid(Some(candidate)) {
            return None;
        }
        Some(Self {
            raw: candidate.to_string(),
            normalized: normalize(candidate),
        })
    }

    /// The code exactly as the user supplied it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `SOURCE/TABLE` with separators collapsed and whitespace removed.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn source_code(&self) -> &str {
        segments(&self.normalized).0
    }

    pub fn table_code(&self) -> &str {
        segments(&self.normalized).1.unwrap_or("")
    }
}

impl fmt::Display for DatasetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}
