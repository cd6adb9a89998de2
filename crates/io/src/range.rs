//! A1-notation cell ranges.

use std::fmt;
use std::str::FromStr;

/// Largest column index accepted (XFD, the last Excel column).
const MAX_COL: usize = 16_383;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell range {0:?} (expected A1 or A1:B2)")]
pub struct RangeError(pub String);

/// Inclusive rectangular range, 0-indexed. `start` is always top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl CellRange {
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    pub fn cell(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    /// Parse `"B2"` or `"B2:C3"`. Case-insensitive, `$` anchors ignored.
    pub fn parse(s: &str) -> Result<Self, RangeError> {
        let err = || RangeError(s.to_string());
        let s = s.trim();
        match s.split_once(':') {
            Some((a, b)) => {
                let (r1, c1) = parse_cell_ref(a).ok_or_else(err)?;
                let (r2, c2) = parse_cell_ref(b).ok_or_else(err)?;
                Ok(Self::new(r1, c1, r2, c2))
            }
            None => {
                let (r, c) = parse_cell_ref(s).ok_or_else(err)?;
                Ok(Self::cell(r, c))
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn cols(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

impl FromStr for CellRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letter(self.start_col), self.start_row + 1)?;
        if self.rows() > 1 || self.cols() > 1 {
            write!(f, ":{}{}", col_to_letter(self.end_col), self.end_row + 1)?;
        }
        Ok(())
    }
}

/// Parse a cell reference like "A1" or "AA100" into (row, col).
fn parse_cell_ref(s: &str) -> Option<(usize, usize)> {
    let s = s.trim().to_uppercase();
    let mut col_str = String::new();
    let mut row_str = String::new();

    for c in s.chars() {
        if c == '$' {
            continue;
        }
        if c.is_ascii_alphabetic() && row_str.is_empty() {
            col_str.push(c);
        } else if c.is_ascii_digit() {
            row_str.push(c);
        } else {
            return None;
        }
    }

    if col_str.is_empty() || row_str.is_empty() || col_str.len() > 3 {
        return None;
    }

    // Convert column letters to index (A=0, B=1, ..., Z=25, AA=26, ...)
    let mut col: usize = 0;
    for c in col_str.chars() {
        col = col * 26 + (c as usize - 'A' as usize + 1);
    }
    col -= 1; // 0-indexed
    if col > MAX_COL {
        return None;
    }

    // Convert row to index (1-indexed in input, 0-indexed internally)
    let row: usize = row_str.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col))
}

/// Convert column index to letter (0 -> A, 1 -> B, 26 -> AA, etc.)
fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}
