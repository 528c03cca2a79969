use std::fmt;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use tracing::info;

use crate::error::{CleanerError, Result};

/// A single cell in the survey table.
///
/// Raw exports carry integer answer codes plus a few free-form columns
/// (coordinates, respondent identifiers). Cells are parsed as integer
/// first, then float, then text; empty cells are `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn parse(raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Missing;
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(x) = raw.parse::<f64>() {
            return Value::Float(x);
        }
        Value::Text(raw.to_string())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => Ok(()),
        }
    }
}

/// The in-memory survey table: one row per respondent, columns in source
/// order. Cleaning rewrites cells and column names but never adds or
/// drops rows, so row count and order match the input file end to end.
#[derive(Debug, Clone)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RecordTable {
    /// Load a comma-delimited survey export with a header row.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
        let table = Self::from_reader(&mut reader)?;
        info!(
            "Loaded {} rows, {} columns from {}",
            table.row_count(),
            table.column_count(),
            path.display()
        );
        Ok(table)
    }

    /// Parse a table from CSV text held in memory.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(content.as_bytes());
        Self::from_reader(&mut reader)
    }

    fn from_reader<R: Read>(reader: &mut csv::Reader<R>) -> Result<Self> {
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Value::parse).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Write the table as CSV: header row first, then rows in held order,
    /// no index column. Missing cells render as empty fields.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure the output directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = WriterBuilder::new().from_path(path)?;

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        writer.flush()?;

        info!("Cleaned data saved to {}", path.display());
        Ok(())
    }

    /// Index of a column by its current name. Referencing a column that
    /// is not in the table is a caller bug and fails loudly.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| CleanerError::MissingColumn(name.to_string()))
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_name(&self, index: usize) -> &str {
        &self.columns[index]
    }

    pub fn set_column_name(&mut self, index: usize, name: String) {
        self.columns[index] = name;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: Value) {
        self.rows[row][column] = value;
    }

    /// The full contents of one row, rendered for diagnostics.
    pub fn row_snapshot(&self, row: usize) -> Vec<(String, String)> {
        self.columns
            .iter()
            .cloned()
            .zip(self.rows[row].iter().map(ToString::to_string))
            .collect()
    }
}
