//! Data-driven test input.
//!
//! Features:
//! - Load tabular test data from JSON or YAML files
//! - Row/column access by index or header name
//! - Row iteration as name/value maps for parameterized tests
//! - Writing result cells back out as JSON
//!
//! Two shapes are accepted: an array of objects (headers taken from the
//! first object) or an array of arrays whose first row is the header row.
//! All cells are carried as strings, matching how spreadsheet-driven suites
//! consume them.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::result::{EsperarError, EsperarResult};

/// Tabular test data: a header row plus string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl DataTable {
    /// Create an empty table with the given headers
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from a parsed JSON value
    pub fn from_json_value(value: &Value) -> EsperarResult<Self> {
        let items = value.as_array().ok_or_else(|| EsperarError::Data {
            message: "expected a top-level array of rows".to_string(),
        })?;

        let Some(first) = items.first() else {
            return Ok(Self::default());
        };

        match first {
            Value::Object(_) => {
                let mut objects = Vec::with_capacity(items.len());
                for item in items {
                    objects.push(item.as_object().ok_or_else(|| EsperarError::Data {
                        message: "mixed row shapes: expected objects in every row".to_string(),
                    })?);
                }

                let mut headers: Vec<String> = Vec::new();
                for object in &objects {
                    for key in object.keys() {
                        if !headers.contains(key) {
                            headers.push(key.clone());
                        }
                    }
                }

                let rows = objects
                    .iter()
                    .map(|object| {
                        headers
                            .iter()
                            .map(|h| object.get(h).map(cell_to_string).unwrap_or_default())
                            .collect()
                    })
                    .collect();
                Ok(Self { headers, rows })
            }
            Value::Array(_) => {
                let mut table_rows: Vec<Vec<String>> = Vec::new();
                for item in items {
                    let row = item.as_array().ok_or_else(|| EsperarError::Data {
                        message: "mixed row shapes: expected arrays in every row".to_string(),
                    })?;
                    table_rows.push(row.iter().map(cell_to_string).collect());
                }
                let headers = table_rows.remove(0);
                Ok(Self {
                    headers,
                    rows: table_rows,
                })
            }
            _ => Err(EsperarError::Data {
                message: "rows must be objects or arrays".to_string(),
            }),
        }
    }

    /// Load a table from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> EsperarResult<Self> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_json_value(&value)
    }

    /// Load a table from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> EsperarResult<Self> {
        let content = fs::read_to_string(path)?;
        let value: Value =
            serde_yaml_ng::from_str(&content).map_err(|err| EsperarError::Data {
                message: format!("invalid YAML: {err}"),
            })?;
        Self::from_json_value(&value)
    }

    /// Header names, in column order
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows (excludes the header row)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Cell value by row and column index
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Cell value by row index and header name
    #[must_use]
    pub fn cell_by_name(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.cell(row, col)
    }

    /// Whether a cell is missing or blank
    #[must_use]
    pub fn is_cell_empty(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).map_or(true, |cell| cell.trim().is_empty())
    }

    /// Append a data row, padded or truncated to the column count
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Overwrite a cell, growing the table if the row does not exist yet
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
        while self.rows.len() <= row {
            self.rows.push(vec![String::new(); self.headers.len()]);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.into();
    }

    /// Iterate rows as header→value maps (the data-provider shape)
    pub fn rows(&self) -> impl Iterator<Item = HashMap<String, String>> + '_ {
        self.rows.iter().map(move |row| {
            self.headers
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
    }

    /// Render as a JSON array of objects
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        Value::Array(
            self.rows()
                .map(|row| {
                    Value::Object(
                        row.into_iter()
                            .map(|(k, v)| (k, Value::String(v)))
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    /// Save the table back out as pretty-printed JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> EsperarResult<()> {
        let json = serde_json::to_string_pretty(&self.to_json_value())?;
        fs::write(path, json)?;
        Ok(())
    }
}
