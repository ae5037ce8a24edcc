//! Tabular input: CSV sheets read into rows of named fields, plus typed views
//! for the sheets the synchronizers consume.

mod error;
mod views;

use std::io::Read;
use std::path::Path;

pub use error::TableError;
pub use views::{
    id_map, practical_schedule_rows, schedule_rows, scoped_id_index, student_rows, text_map,
    ScheduleColumns,
};

/// A sheet with a header row. Cells are kept as trimmed text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table from headers and rows. Short rows are padded with blanks.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Reads CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self::new(headers, rows))
    }

    /// Reads a CSV file with a header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        Self::from_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Iterates rows as named-field views. Rows where every cell is blank are
    /// skipped (sheet exports often end with empty lines).
    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(move |(index, cells)| TableRow {
                table: self,
                index,
                cells,
            })
    }
}

/// One row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a Table,
    index: usize,
    cells: &'a [String],
}

impl<'a> TableRow<'a> {
    /// 1-based line number in the sheet, counting the header row.
    pub fn line(&self) -> usize {
        self.index + 2
    }

    /// Cell value by column name; `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.table.column_index(column)?;
        self.cells.get(index).map(String::as_str)
    }

    /// Non-blank cell value by column name.
    pub fn non_blank(&self, column: &str) -> Option<&'a str> {
        self.get(column).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Cells with their headers, in sheet order.
    pub fn labelled(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.table
            .headers
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }
}
