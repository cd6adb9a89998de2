// CSV-backed sheet: load, read a selection, append rows, save

use std::io::Read;
use std::path::{Path, PathBuf};

use gridfeed_core::{CellValue, SelectionContents};

use crate::range::CellRange;

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single sheet held as rows of cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
    delimiter: u8,
}

impl Default for Sheet {
    fn default() -> Self {
        Self { rows: Vec::new(), delimiter: b',' }
    }
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows, ..Self::default() }
    }

    /// Load a CSV/TSV file, sniffing the delimiter.
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let content = read_file_as_utf8(path)?;
        Self::from_csv_str(&content)
    }

    /// Like [`Sheet::load`], but a missing file is an empty sheet.
    pub fn load_or_empty(path: &Path) -> Result<Self, SheetError> {
        if !path.exists() {
            log::debug!("{} does not exist; starting an empty sheet", path.display());
            return Ok(Self::new());
        }
        Self::load(path)
    }

    pub fn from_csv_str(content: &str) -> Result<Self, SheetError> {
        let delimiter = sniff_delimiter(content);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { rows, delimiter })
    }

    /// Write the sheet back with the delimiter it was loaded with.
    pub fn save(&self, path: &Path) -> Result<(), SheetError> {
        let write_err = |source| SheetError::Write { path: path.to_path_buf(), source };

        let file = std::fs::File::create(path).map_err(write_err)?;
        // Loaded rows keep their own widths, appended rows have theirs
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(std::io::BufWriter::new(file));

        for row in &self.rows[..self.row_count()] {
            if row.is_empty() {
                // A bare newline would be skipped on reload and shift later rows
                writer.write_record([""])?;
            } else {
                writer.write_record(row)?;
            }
        }

        writer.flush().map_err(write_err)?;
        Ok(())
    }

    /// Number of rows up to and including the last non-empty one.
    pub fn row_count(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|v| !v.is_empty()))
            .map_or(0, |i| i + 1)
    }

    /// Cell text, empty outside the data extent.
    pub fn get(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows[..self.row_count()]
    }

    /// Snapshot of the values inside `range`.
    pub fn selection(&self, range: &CellRange) -> SelectionContents {
        let rows = (range.start_row..=range.end_row)
            .map(|r| {
                (range.start_col..=range.end_col)
                    .map(|c| CellValue::from_raw(self.get(r, c)))
                    .collect()
            })
            .collect();
        SelectionContents::new(rows)
    }

    /// Append `rows` below the last non-empty row.
    ///
    /// Returns the 0-based index of the first appended row.
    pub fn append_rows(&mut self, rows: Vec<Vec<String>>) -> usize {
        let first = self.row_count();
        self.rows.truncate(first);
        self.rows.extend(rows);
        first
    }
}

/// Pick the delimiter that splits the first lines into the widest
/// consistent grid. Falls back to comma when no candidate splits line one.
fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
    const SAMPLE_LINES: usize = 10;

    let sample: String = content
        .lines()
        .take(SAMPLE_LINES)
        .flat_map(|line| [line, "\n"])
        .collect();

    CANDIDATES
        .iter()
        .filter_map(|&delim| {
            let widths: Vec<usize> = csv::ReaderBuilder::new()
                .delimiter(delim)
                .has_headers(false)
                .flexible(true)
                .from_reader(sample.as_bytes())
                .records()
                .map_while(Result::ok)
                .map(|record| record.len())
                .collect();

            let first = *widths.first()?;
            if first < 2 {
                return None;
            }
            let agreeing = widths.iter().filter(|&&w| w == first).count();
            Some((delim, agreeing * first))
        })
        // Ties go to the earlier candidate
        .fold(None, |best: Option<(u8, usize)>, (delim, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((delim, score)),
        })
        .map_or(b',', |(delim, _)| delim)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
fn read_file_as_utf8(path: &Path) -> Result<String, SheetError> {
    let read_err = |source| SheetError::Read { path: path.to_path_buf(), source };

    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridfeed_core::infer_candidate;
    use std::fs;
    use tempfile::tempdir;

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect()
    }

    #[test]
    fn test_selection_single_cell() {
        let sheet = Sheet::from_csv_str("code\nTAMMER1/SHIBOR\n").unwrap();
        let sel = sheet.selection(&CellRange::parse("A2").unwrap());
        assert_eq!(sel, SelectionContents::from_text_rows([["TAMMER1/SHIBOR"]]));
    }

    #[test]
    fn test_selection_pads_outside_extent() {
        let sheet = Sheet::from_csv_str("WIKI,AAPL\n").unwrap();
        let sel = sheet.selection(&CellRange::parse("B1:C2").unwrap());
        assert_eq!(sel.row_count(), 2);
        assert_eq!(sel.rows()[0], vec![CellValue::Text("AAPL".into()), CellValue::Empty]);
        assert_eq!(sel.rows()[1], vec![CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn test_selection_keeps_numeric_looking_text() {
        let sheet = Sheet::from_csv_str("HKEX,00005\nTSE,1e3\n").unwrap();

        let first = sheet.selection(&CellRange::parse("A1:B1").unwrap());
        assert_eq!(first.rows()[0][1], CellValue::Text("00005".into()));
        assert_eq!(infer_candidate(&first).as_deref(), Some("HKEX/00005"));

        let second = sheet.selection(&CellRange::parse("A2:B2").unwrap());
        assert_eq!(infer_candidate(&second).as_deref(), Some("TSE/1e3"));
    }

    #[test]
    fn test_sniffs_semicolons() {
        let sheet = Sheet::from_csv_str("a;b;c\n1;2;3\n").unwrap();
        assert_eq!(sheet.get(1, 2), "3");
    }

    #[test]
    fn test_append_after_last_non_empty_row() {
        let mut sheet = Sheet::from_rows(strings(&[&["WIKI/AAPL"], &[""], &["note"], &["", ""]]));
        assert_eq!(sheet.row_count(), 3);

        let first = sheet.append_rows(strings(&[&["Date", "Close"], &["2015-01-02", "109.33"]]));
        assert_eq!(first, 3);
        assert_eq!(sheet.row_count(), 5);
        assert_eq!(sheet.get(4, 1), "109.33");
    }

    #[test]
    fn test_append_to_empty_sheet() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.append_rows(strings(&[&["x"]])), 0);
        assert_eq!(sheet.get(0, 0), "x");
    }

    #[test]
    fn test_save_keeps_blank_rows_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.csv");

        let sheet = Sheet::from_rows(strings(&[&["a", "b"], &["", ""], &["c", ""]]));
        sheet.save(&path).unwrap();

        let reloaded = Sheet::load(&path).unwrap();
        assert_eq!(reloaded.get(0, 1), "b");
        assert_eq!(reloaded.get(1, 0), "");
        assert_eq!(reloaded.get(2, 0), "c");
        assert_eq!(reloaded.row_count(), 3);
    }

    #[test]
    fn test_save_leaves_existing_rows_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let original = "code,,\n,,\nWIKI/AAPL,x,\n";
        fs::write(&path, original).unwrap();

        let mut sheet = Sheet::load(&path).unwrap();
        sheet.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        sheet.append_rows(strings(&[&["Date", "Value"]]));
        sheet.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{}Date,Value\n", original));
    }

    #[test]
    fn test_sniffs_tabs_and_pipes() {
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b\n1|2\n"), b'|');
        assert_eq!(sniff_delimiter("\"x,y\";z\n1;2\n"), b';');
        assert_eq!(sniff_delimiter("single\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_load_or_empty_missing_file() {
        let dir = tempdir().unwrap();
        let sheet = Sheet::load_or_empty(&dir.path().join("missing.csv")).unwrap();
        assert_eq!(sheet.row_count(), 0);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = Sheet::load(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, SheetError::Read { .. }));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        fs::write(&path, b"caf\xe9,1\n").unwrap();

        let sheet = Sheet::load(&path).unwrap();
        assert_eq!(sheet.get(0, 0), "caf\u{e9}");
    }
}
