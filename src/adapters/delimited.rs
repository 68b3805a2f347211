//! Delimited file adapters
//!
//! [`DelimitedFileReader`] turns the in-flight file into records, one per
//! non-blank line with exactly three fields. [`LineAppender`] appends text
//! lines to the export output, creating the file only on first write.

use crate::core::pipeline::ItemReader;
use crate::domain::{FerryError, Record, Result};
use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Number of fields every input line must carry
pub const FIELDS_PER_LINE: usize = 3;

/// Reads records from a headerless delimited file
pub struct DelimitedFileReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    buffer: StringRecord,
}

impl DelimitedFileReader {
    /// Open `path` for reading with the given single-byte delimiter
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            FerryError::Io(format!("Cannot open '{}': {e}", path.display()))
        })?;

        let reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(file);

        Ok(Self {
            path,
            reader,
            buffer: StringRecord::new(),
        })
    }

    /// Path being read
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ItemReader<Record> for DelimitedFileReader {
    async fn read(&mut self) -> Result<Option<Record>> {
        if !self.reader.read_record(&mut self.buffer)? {
            return Ok(None);
        }

        let line = self.buffer.position().map_or(0, |p| p.line());
        if self.buffer.len() != FIELDS_PER_LINE {
            return Err(FerryError::Parse(format!(
                "{}:{line}: expected {FIELDS_PER_LINE} fields, found {}",
                self.path.display(),
                self.buffer.len()
            )));
        }

        let record = Record::new(&self.buffer[0], &self.buffer[1], &self.buffer[2]);
        tracing::trace!(line, record = %record, "Read record");
        Ok(Some(record))
    }
}

/// Appends lines to a file, opening it lazily
///
/// Nothing touches the file system until the first call to
/// [`LineAppender::append`], so a run with nothing to write leaves no file.
pub struct LineAppender {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl LineAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    /// Path being appended to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append each line followed by a newline, then flush
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be
    /// created, or the write fails.
    pub fn append<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open()?,
        };

        for line in lines {
            writer.write_all(line.as_ref().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        self.writer = Some(writer);
        Ok(())
    }

    fn open(&self) -> Result<BufWriter<File>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FerryError::Io(format!("Cannot open '{}': {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), "Opened output file for append");
        Ok(BufWriter::new(file))
    }
}
