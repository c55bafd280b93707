use std::io::{Read, Write};

use anyhow::{Context, Result, bail};

/// The three physical tables kept on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    /// Basic info, handprint, milestones and birthday rows, discriminated by `ページ`.
    Profile,
    GrowthLog,
    Notes,
}

impl TableId {
    pub const ALL: [TableId; 3] = [Self::Profile, Self::GrowthLog, Self::Notes];

    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Profile => "pet_journal_data.csv",
            Self::GrowthLog => "growth_log.csv",
            Self::Notes => "memo_log.csv",
        }
    }
}

/// Column names shared across tables.
pub mod col {
    pub const NAME: &str = "名前";
    pub const PAGE: &str = "ページ";
}

/// One row to be written: ordered `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(Vec<(String, String)>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter. Setting an existing column replaces its value in place.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(cell) = self.0.iter_mut().find(|(c, _)| c == column) {
            cell.1 = value;
        } else {
            self.0.push((column.to_string(), value));
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Project this row onto `columns`. Absent columns project to the empty string.
    #[must_use]
    pub fn key(&self, columns: &[&str]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.get(c).unwrap_or_default().to_string())
            .collect()
    }
}

/// Read access to named cells, shared by owned rows and stored records.
pub trait Cells {
    fn cell(&self, column: &str) -> Option<&str>;
}

impl Cells for Row {
    fn cell(&self, column: &str) -> Option<&str> {
        self.get(column)
    }
}

impl Cells for RowRef<'_> {
    fn cell(&self, column: &str) -> Option<&str> {
        self.get(column)
    }
}

/// A borrowed view of one stored record.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> RowRef<'a> {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.cells.get(idx).map(String::as_str)
    }

    #[must_use]
    pub fn key(&self, columns: &[&str]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.get(c).unwrap_or_default().to_string())
            .collect()
    }

    #[must_use]
    pub fn to_row(&self) -> Row {
        Row(self
            .headers
            .iter()
            .zip(self.cells)
            .map(|(h, v)| (h.clone(), v.clone()))
            .collect())
    }
}

/// An in-memory CSV table: a header union plus string records.
///
/// Every record has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.records.iter().map(|cells| RowRef {
            headers: &self.headers,
            cells,
        })
    }

    fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(idx) = self.headers.iter().position(|h| h == column) {
            return idx;
        }
        self.headers.push(column.to_string());
        for record in &mut self.records {
            record.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Append a row. Columns the table has not seen yet are added to the end of the
    /// header and older records get an empty cell for them.
    pub fn push(&mut self, row: Row) {
        let mut record = vec![String::new(); self.headers.len()];
        for (column, value) in row.0 {
            let idx = self.ensure_column(&column);
            if idx >= record.len() {
                record.resize(idx + 1, String::new());
            }
            record[idx] = value;
        }
        self.records.push(record);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            self.push(row);
        }
    }

    /// Keep only the records for which `keep` returns true. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&RowRef<'_>) -> bool) -> usize {
        let headers = &self.headers;
        let before = self.records.len();
        self.records.retain(|cells| keep(&RowRef { headers, cells }));
        before - self.records.len()
    }

    /// Parse a table from CSV with a header line.
    ///
    /// Short records are padded with empty cells; a record with more cells than the
    /// header is rejected. An empty input is an empty table.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(ToString::to_string)
            .collect();

        if headers.iter().all(String::is_empty) {
            return Ok(Self::new());
        }

        let mut records = Vec::new();
        for (line_num, result) in rdr.records().enumerate() {
            let record =
                result.with_context(|| format!("Failed to parse CSV row {}", line_num + 2))?;
            if record.len() > headers.len() {
                bail!(
                    "CSV row {} has {} fields, header has {}",
                    line_num + 2,
                    record.len(),
                    headers.len()
                );
            }
            let mut cells: Vec<String> = record.iter().map(ToString::to_string).collect();
            cells.resize(headers.len(), String::new());
            records.push(cells);
        }

        Ok(Self { headers, records })
    }

    /// Write the table as CSV with a header line. A table with no columns writes nothing.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        if self.headers.is_empty() {
            return Ok(());
        }
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for record in &self.records {
            wtr.write_record(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
