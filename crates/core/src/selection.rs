use serde::{Deserialize, Serialize};

/// A single scalar read out of a spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Cell read from untyped storage such as CSV. Blank is empty, anything
    /// else keeps its literal text ("00005" must not become 5).
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// Plain-text rendering used when a cell becomes part of a dataset code.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                // Avoid ".0" suffix for whole numbers
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Snapshot of the values in the currently selected range, row by row.
///
/// Rows need not be the same length. The snapshot is read once per import
/// and never written back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionContents {
    rows: Vec<Vec<CellValue>>,
}

impl SelectionContents {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// One selected cell holding `value`.
    pub fn single(value: impl Into<CellValue>) -> Self {
        Self { rows: vec![vec![value.into()]] }
    }

    /// Convenience for building a text-only grid.
    pub fn from_text_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| CellValue::from(c.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The only row, if the selection spans exactly one row.
    pub fn single_row(&self) -> Option<&[CellValue]> {
        match self.rows.as_slice() {
            [row] => Some(row.as_slice()),
            _ => None,
        }
    }
}
