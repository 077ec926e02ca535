//! Delimited table parsing for data files linked from quiz pages

use thiserror::Error;

/// Errors from table parsing and aggregation
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("table is empty")]
    Empty,

    #[error("line {line}: expected at most {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("delimiter {0:?} is not ASCII")]
    Delimiter(char),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("no numeric column")]
    NoNumericColumn,
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Malformed {
            line: err.position().map_or(0, |pos| pos.line() as usize),
            reason: err.to_string(),
        }
    }
}

/// A typed table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Parsed table: a header row plus typed data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Numeric values of a column, skipping non-numeric cells
    pub fn column_numbers(&self, idx: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(Cell::as_number))
            .collect()
    }

    /// Index of the first column whose non-empty cells are all numbers
    pub fn first_numeric_column(&self) -> Option<usize> {
        (0..self.headers.len()).find(|&idx| {
            let mut cells = self
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .filter(|cell| **cell != Cell::Empty)
                .peekable();
            cells.peek().is_some() && cells.all(|cell| matches!(cell, Cell::Number(_)))
        })
    }

    /// Sum of first-column values at or above `cutoff`
    pub fn sum_first_column_at_least(&self, cutoff: f64) -> f64 {
        self.column_numbers(0)
            .into_iter()
            .filter(|v| *v >= cutoff)
            .sum()
    }

    /// Sum of the first numeric column
    pub fn sum_first_numeric_column(&self) -> Result<f64, ParseError> {
        let idx = self.first_numeric_column().ok_or(ParseError::NoNumericColumn)?;
        Ok(self.column_numbers(idx).into_iter().sum())
    }
}

/// Parses tabular text into rows with typed columns
pub trait TableParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<Table, ParseError>;
}

/// Comma/tab separated values read with the `csv` crate.
///
/// Without an explicit delimiter, a header line that has tabs but no
/// commas selects tab separation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedParser {
    delimiter: Option<char>,
}

impl DelimitedParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    fn sniff(header: &str) -> char {
        if header.contains('\t') && !header.contains(',') {
            '\t'
        } else {
            ','
        }
    }
}

impl TableParser for DelimitedParser {
    fn parse(&self, text: &str) -> Result<Table, ParseError> {
        let text = text.trim_start_matches('\u{feff}');
        let body = text.trim_start();
        let header = body.lines().next().filter(|line| !line.trim().is_empty());
        let header = header.ok_or(ParseError::Empty)?;

        let delimiter = self.delimiter.unwrap_or_else(|| Self::sniff(header));
        if !delimiter.is_ascii() {
            return Err(ParseError::Delimiter(delimiter));
        }
        // Blank lines skipped before the header still count for line numbers
        let skipped_lines = text[..text.len() - body.len()].matches('\n').count();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            let line = skipped_lines + record.position().map_or(0, |pos| pos.line() as usize);
            if record.len() > headers.len() {
                return Err(ParseError::RaggedRow {
                    line,
                    expected: headers.len(),
                    found: record.len(),
                });
            }

            let mut row: Vec<Cell> = record.iter().map(Cell::infer).collect();
            row.resize(headers.len(), Cell::Empty);
            rows.push(row);
        }

        Ok(Table { headers, rows })
    }
}

/// Delimiter for a link to a tabular file, judged by its extension
pub fn tabular_delimiter(href: &str) -> Option<char> {
    let path = href.split(['?', '#']).next().unwrap_or(href).to_lowercase();
    if path.ends_with(".csv") {
        Some(',')
    } else if path.ends_with(".tsv") {
        Some('\t')
    } else {
        None
    }
}
