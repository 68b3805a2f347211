//! Export flow: unprocessed rows → output file + processed flag

use super::format::format_line;
use super::Flow;
use crate::adapters::delimited::LineAppender;
use crate::adapters::store::RecordStore;
use crate::core::pipeline::{
    ChunkLoggingListener, ChunkedPipeline, CompositeWriter, FaultPolicy, ItemWriter, IterReader,
    PassThrough, RunOutcome, ZeroReadListener,
};
use crate::domain::context::ResultExt;
use crate::domain::{JobKind, Record, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Appends each record of a chunk to the output file in the fixed-width format
pub struct FormattedFileWriter {
    output: LineAppender,
}

impl FormattedFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            output: LineAppender::new(path),
        }
    }
}

#[async_trait]
impl ItemWriter<Record> for FormattedFileWriter {
    async fn write(&mut self, items: &[Record]) -> Result<()> {
        self.output
            .append(items.iter().map(format_line))
            .with_context(|| format!("Writing {}", self.output.path().display()))
    }
}

/// Flags every record of a chunk as processed, keyed by `field1`
pub struct MarkProcessedWriter {
    store: Arc<dyn RecordStore>,
}

impl MarkProcessedWriter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ItemWriter<Record> for MarkProcessedWriter {
    async fn write(&mut self, items: &[Record]) -> Result<()> {
        let keys: Vec<String> = items.iter().map(|r| r.key().to_string()).collect();
        self.store.mark_processed_all(&keys).await
    }
}

/// Settings for [`ExportFlow`]
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// File the formatted lines are appended to
    pub output_file: PathBuf,

    /// Records per chunk
    pub chunk_size: usize,
}

/// Writes unprocessed store rows to the output file and marks them processed
pub struct ExportFlow {
    store: Arc<dyn RecordStore>,
    settings: ExportSettings,
}

impl ExportFlow {
    pub fn new(store: Arc<dyn RecordStore>, settings: ExportSettings) -> Self {
        Self { store, settings }
    }
}

#[async_trait]
impl Flow for ExportFlow {
    fn job(&self) -> JobKind {
        JobKind::Export
    }

    async fn execute(&self) -> Result<RunOutcome> {
        let rows = self
            .store
            .query_unprocessed()
            .await
            .context("Store unavailable for export")?;

        tracing::info!(
            unprocessed = rows.len(),
            output = %self.settings.output_file.display(),
            "Starting export"
        );

        let writer = CompositeWriter::new()
            .with(FormattedFileWriter::new(&self.settings.output_file))
            .with(MarkProcessedWriter::new(self.store.clone()));

        let pipeline = ChunkedPipeline::builder(JobKind::Export.as_str())
            .reader(IterReader::new(rows))
            .processor(PassThrough)
            .writer(writer)
            .chunk_size(self.settings.chunk_size)
            .fault_policy(FaultPolicy::FailFast)
            .listener(Arc::new(ChunkLoggingListener))
            .listener(Arc::new(ZeroReadListener))
            .build()?;

        Ok(pipeline.run().await)
    }
}
