use serde_json::Value;

use crate::client::FetchError;

/// Column names and rows extracted from a dataset response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    /// `SOURCE/TABLE` as reported by the server, if present
    pub code: Option<String>,
    pub name: Option<String>,
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Extract a dataset from a response body.
    ///
    /// Accepts both the flat layout (`column_names`/`data` at the top level)
    /// and the layout that nests them under `dataset`.
    pub fn from_json(body: &Value) -> Result<Self, FetchError> {
        let root = match body.get("dataset") {
            Some(inner) if inner.is_object() => inner,
            _ => body,
        };

        let data = root["data"]
            .as_array()
            .ok_or_else(|| FetchError::Parse("response missing 'data' array".into()))?;

        let column_names = match root.get("column_names") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(names)) => names.iter().map(render_scalar).collect(),
            Some(_) => {
                return Err(FetchError::Parse("'column_names' is not an array".into()));
            }
        };

        let mut rows = Vec::with_capacity(data.len());
        for (i, row) in data.iter().enumerate() {
            let cells = row.as_array().ok_or_else(|| {
                FetchError::Parse(format!("data row {} is not an array", i))
            })?;
            rows.push(cells.iter().map(render_scalar).collect());
        }

        let code = match (root["source_code"].as_str(), root["code"].as_str()) {
            (Some(source), Some(table)) => Some(format!("{}/{}", source, table)),
            _ => root["dataset_code"].as_str().map(String::from),
        };

        Ok(Self {
            code,
            name: root["name"].as_str().map(String::from),
            column_names,
            rows,
        })
    }

    /// Rows to write into a sheet, optionally preceded by the column names.
    pub fn sheet_rows(&self, include_headers: bool) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        if include_headers && !self.column_names.is_empty() {
            out.push(self.column_names.clone());
        }
        out.extend(self.rows.iter().cloned());
        out
    }
}

/// Cell text for a JSON scalar.
fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(0.0);
                // Avoid ".0" suffix for whole numbers
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
        other => other.to_string(),
    }
}
