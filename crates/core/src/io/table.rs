//! Header-indexed comma-separated tables
//!
//! Every tabular input (attributes, weather, ignitions, harvest plan, fuel
//! lookup, tuning) is read through [`Table`]: the first non-blank line names
//! the columns, columns are addressed by name (case-insensitive) so their
//! order is immaterial, and every parse failure reports the file, the line
//! and the column.

use std::path::Path;

use crate::error::{SimError, SimResult};

/// One data line of a table
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based line number in the source file
    pub line: usize,
    fields: Vec<String>,
}

impl TableRow {
    /// Raw text of a column, empty when the line is short
    #[inline]
    pub fn text(&self, column: usize) -> &str {
        self.fields.get(column).map_or("", String::as_str)
    }
}

/// A parsed table with named columns
#[derive(Debug, Clone)]
pub struct Table {
    source_name: String,
    headers: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Read and parse a table from disk
    pub fn read(path: &Path) -> SimResult<Self> {
        let source_name = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::data(&source_name, format!("cannot read file: {e}")))?;
        Self::parse(source_name, &text)
    }

    /// Parse table text; `source_name` labels errors
    pub fn parse(source_name: impl Into<String>, text: &str) -> SimResult<Self> {
        let source_name = source_name.into();
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let Some((_, header_line)) = lines.next() else {
            return Err(SimError::data(&source_name, "file is empty, expected a header line"));
        };
        let headers = split_fields(header_line.trim_start_matches('\u{feff}'));

        let rows = lines
            .map(|(line, text)| TableRow {
                line,
                fields: split_fields(text),
            })
            .collect();

        Ok(Self {
            source_name,
            headers,
            rows,
        })
    }

    /// Name used in error messages
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of an optional column
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }

    /// Index of a required column
    pub fn column(&self, name: &str) -> SimResult<usize> {
        self.optional_column(name).ok_or_else(|| {
            SimError::data(
                &self.source_name,
                format!("missing required column '{name}'"),
            )
        })
    }

    /// Check that every listed column is present
    pub fn require_columns(&self, names: &[&str]) -> SimResult<()> {
        names.iter().try_for_each(|name| self.column(name).map(|_| ()))
    }

    /// Data error pointing at a row and column
    pub fn error_at(&self, row: &TableRow, column: usize, message: impl std::fmt::Display) -> SimError {
        let name = self.headers.get(column).map_or("?", String::as_str);
        SimError::data(
            &self.source_name,
            format!("line {}, column '{}': {}", row.line, name, message),
        )
    }

    /// Parse a required number
    pub fn number(&self, row: &TableRow, column: usize) -> SimResult<f64> {
        self.optional_number(row, column)?
            .ok_or_else(|| self.error_at(row, column, "value is missing"))
    }

    /// Parse a number, `None` for an empty field
    ///
    /// Non-finite values are rejected.
    pub fn optional_number(&self, row: &TableRow, column: usize) -> SimResult<Option<f64>> {
        let text = row.text(column);
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            Ok(value) => Err(self.error_at(row, column, format!("non-finite value {value}"))),
            Err(_) => Err(self.error_at(row, column, format!("cannot parse '{text}' as a number"))),
        }
    }

    /// Parse a required integer (accepts `12` and `12.0`)
    pub fn integer(&self, row: &TableRow, column: usize) -> SimResult<i64> {
        let value = self.number(row, column)?;
        if value.fract() != 0.0 {
            return Err(self.error_at(row, column, format!("expected an integer, got {value}")));
        }
        Ok(value as i64)
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().trim_matches('"').trim().to_string())
        .collect()
}
