//! Append-only CSV logs.
//!
//! Each row is written by opening the file in append mode, so several sinks can
//! point to the same file and rows are never read back. Text cells are quoted
//! with `'` and numeric cells are written bare.
use anyhow::Result;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::{
    fmt,
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

/// A cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum LogCell {
    /// An integer, like a step count.
    Int(i64),

    /// A real value, like a reward.
    Float(f32),

    /// A label.
    Text(String),

    /// An empty cell separating the row header from values.
    Blank,
}

impl fmt::Display for LogCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Text(s) => write!(f, "{}", s),
            Self::Blank => Ok(()),
        }
    }
}

impl From<&str> for LogCell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for LogCell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<usize> for LogCell {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u8> for LogCell {
    fn from(v: u8) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f32> for LogCell {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

/// Append-only CSV file identified by its path.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvLogSink {
    path: PathBuf,
}

impl CsvLogSink {
    /// Creates a sink; the file is created on the first row.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Writer<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(WriterBuilder::new()
            .quote(b'\'')
            .quote_style(QuoteStyle::NonNumeric)
            .flexible(true)
            .from_writer(file))
    }

    fn write(wtr: &mut Writer<File>, cells: &[LogCell]) -> Result<()> {
        wtr.write_record(cells.iter().map(|c| c.to_string()))?;
        wtr.flush()?;
        Ok(())
    }

    /// Appends a row.
    pub fn append_row(&self, cells: &[LogCell]) -> Result<()> {
        Self::write(&mut self.open()?, cells)
    }

    /// Appends one row to each sink, in order.
    ///
    /// All files are opened before the first row is written, so that a file
    /// which cannot be opened leaves every sink without the new row.
    pub fn append_rows(rows: &[(&CsvLogSink, &[LogCell])]) -> Result<()> {
        let mut writers = Vec::with_capacity(rows.len());
        for (sink, _) in rows {
            writers.push(sink.open()?);
        }
        for (wtr, (_, cells)) in writers.iter_mut().zip(rows) {
            Self::write(wtr, cells)?;
        }
        Ok(())
    }

    /// Appends `header` followed by `values`.
    pub fn append_values<T>(&self, header: &[LogCell], values: &[T]) -> Result<()>
    where
        T: Clone + Into<LogCell>,
    {
        let row = header
            .iter()
            .cloned()
            .chain(values.iter().cloned().map(Into::into))
            .collect::<Vec<_>>();
        self.append_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;
    use tempdir::TempDir;

    fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
        let mut rdr = ReaderBuilder::new()
            .quote(b'\'')
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut rows = vec![];
        for r in rdr.records() {
            rows.push(r?.iter().map(|s| s.to_string()).collect());
        }
        Ok(rows)
    }

    #[test]
    fn rows_are_appended_across_sinks() -> Result<()> {
        let dir = TempDir::new("log_sink")?;
        let path = dir.path().join("wins.csv");

        CsvLogSink::new(&path).append_values(
            &[LogCell::Int(5), LogCell::Int(2), LogCell::Blank],
            &[1u8, 0],
        )?;
        CsvLogSink::new(&path).append_values(&["FlashMan".into(), "".into()], &[12.5f32])?;

        let rows = read_rows(&path)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["5", "2", "", "1", "0"]);
        assert_eq!(rows[1], vec!["FlashMan", "", "12.5"]);
        Ok(())
    }

    #[test]
    fn text_is_quoted_numbers_are_not() -> Result<()> {
        let dir = TempDir::new("log_sink")?;
        let path = dir.path().join("rewards.csv");

        CsvLogSink::new(&path).append_row(&["AirMan (0.1, 0.9)".into(), LogCell::Float(-3.0)])?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content, "'AirMan (0.1, 0.9)',-3.0\n");
        Ok(())
    }

    #[test]
    fn no_row_is_appended_if_a_file_cannot_be_opened() -> Result<()> {
        let dir = TempDir::new("log_sink")?;
        let wins = CsvLogSink::new(dir.path().join("wins.csv"));
        let rewards = CsvLogSink::new(dir.path().join("rewards.csv"));
        std::fs::create_dir(rewards.path())?;

        let row = [LogCell::Int(5), LogCell::Int(1), LogCell::Blank, LogCell::Int(1)];
        assert!(CsvLogSink::append_rows(&[(&wins, &row[..]), (&rewards, &row[..])]).is_err());
        assert_eq!(std::fs::read_to_string(wins.path())?, "");

        std::fs::remove_dir(rewards.path())?;
        CsvLogSink::append_rows(&[(&wins, &row[..]), (&rewards, &row[..])])?;
        assert_eq!(read_rows(wins.path())?, vec![vec!["5", "1", "", "1"]]);
        assert_eq!(read_rows(rewards.path())?, vec![vec!["5", "1", "", "1"]]);
        Ok(())
    }
}
