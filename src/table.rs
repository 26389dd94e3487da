//! Table assembly and CSV serialization.
//!
//! Tables are written as plain comma-separated text first. A value holding
//! the delimiter, a quote or a line break cannot be written that way; the
//! table is then written once more with quoting and backslash escapes. Read
//! tables back with [`read_csv`], which understands both forms.

use crate::error::{OpenReviewError, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Field delimiter for every table
pub const DELIMITER: u8 = b',';

/// Escape character used by the fallback serialization
pub const ESCAPE: u8 = b'\\';

/// One output record: column name and value, in schema order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(&'static str, Value)>,
}

impl Row {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: &'static str, value: Value) {
        self.cells.push((column, value));
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(c, _)| *c)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    /// Cell texts as they appear in the CSV file
    pub fn rendered(&self) -> Vec<String> {
        self.cells.iter().map(|(_, v)| render_cell(v)).collect()
    }
}

/// Text form of a cell. Lists and objects are written as JSON.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// How a table ended up on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Unquoted delimited text
    Plain,
    /// Every field quoted, embedded quotes and backslashes escaped with a backslash
    Escaped,
}

/// Ordered rows sharing one header
#[derive(Debug, Default)]
pub struct Table {
    columns: Vec<&'static str>,
    rows: Vec<Row>,
}

impl Table {
    /// Collect rows in the order given. The header comes from the first row;
    /// every later row must have the same columns.
    pub fn assemble(rows: Vec<Row>) -> Result<Self> {
        let columns: Vec<&'static str> = rows.first().map(|r| r.columns().collect()).unwrap_or_default();
        for (idx, row) in rows.iter().enumerate() {
            if !row.columns().eq(columns.iter().copied()) {
                return Err(OpenReviewError::Validation(format!(
                    "row {} does not match the table header {:?}",
                    idx, columns
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize to any writer, falling back to escaped output when the plain
    /// form would be ambiguous.
    pub fn write<W: Write>(&self, out: W) -> Result<WriteMode> {
        let records: Vec<Vec<String>> = self.rows.iter().map(Row::rendered).collect();

        let mode = match check_plain(&self.columns, &records) {
            Ok(()) => WriteMode::Plain,
            Err(OpenReviewError::Escape { column }) => {
                warn!(column = %column, "Plain CSV output needs escaping, retrying with backslash escapes");
                WriteMode::Escaped
            }
            Err(e) => return Err(e),
        };

        let mut wtr = writer_builder(mode).from_writer(out);
        if !self.columns.is_empty() {
            wtr.write_record(self.columns.iter().map(|c| escape_for(mode, c)))?;
        }
        for record in &records {
            wtr.write_record(record.iter().map(|v| escape_for(mode, v)))?;
        }
        wtr.flush()?;
        Ok(mode)
    }

    /// Write the table to `path`, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<WriteMode> {
        let file = File::create(path)?;
        let mode = self.write(file)?;
        info!(path = %path.display(), rows = self.len(), mode = ?mode, "Saved table");
        Ok(mode)
    }
}

/// Fail with [`OpenReviewError::Escape`] on the first value that unquoted
/// output would corrupt.
fn check_plain(columns: &[&'static str], records: &[Vec<String>]) -> Result<()> {
    let needs_escape = |s: &str| s.bytes().any(|b| matches!(b, DELIMITER | b'"' | b'\n' | b'\r'));

    if let Some(column) = columns.iter().find(|c| needs_escape(**c)) {
        return Err(OpenReviewError::Escape {
            column: column.to_string(),
        });
    }
    for record in records {
        if let Some(idx) = record.iter().position(|v| needs_escape(v.as_str())) {
            return Err(OpenReviewError::Escape {
                column: columns.get(idx).map(|c| c.to_string()).unwrap_or_default(),
            });
        }
    }
    Ok(())
}

/// The csv writer escapes quotes only; escaped output must also escape the
/// escape character or the reader drops it.
fn escape_for(mode: WriteMode, value: &str) -> Cow<'_, [u8]> {
    match mode {
        WriteMode::Escaped if value.contains('\\') => Cow::Owned(value.replace('\\', "\\\\").into_bytes()),
        _ => Cow::Borrowed(value.as_bytes()),
    }
}

fn writer_builder(mode: WriteMode) -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(DELIMITER).has_headers(false);
    match mode {
        WriteMode::Plain => {
            builder.quote_style(csv::QuoteStyle::Never);
        }
        WriteMode::Escaped => {
            builder
                .quote_style(csv::QuoteStyle::Always)
                .double_quote(false)
                .escape(ESCAPE);
        }
    }
    builder
}

/// Reader settings matching both write modes
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(DELIMITER)
        .has_headers(true)
        .double_quote(false)
        .escape(Some(ESCAPE));
    builder
}

/// Parse a table written by [`Table::write`] into header and cell texts.
pub fn read_csv<R: Read>(input: R) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rdr = reader_builder().from_reader(input);
    let header = rdr.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();
    for record in rdr.records() {
        records.push(record?.iter().map(str::to_string).collect());
    }
    Ok((header, records))
}
