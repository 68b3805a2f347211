//! Ingest flow: in-flight file → validate → tag → store

use super::Flow;
use crate::adapters::delimited::DelimitedFileReader;
use crate::adapters::store::RecordStore;
use crate::core::pipeline::{
    ChunkLoggingListener, ChunkedPipeline, FaultPolicy, ItemProcessor, ItemWriter, RunOutcome,
};
use crate::core::validation::RecordValidator;
use crate::domain::context::ResultExt;
use crate::domain::{JobKind, Record, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Marker prefixed to every field before it is stored
pub const READ_TAG: &str = "READ:";

/// Validates a raw record, then prefixes each field with [`READ_TAG`]
pub struct IngestProcessor {
    validator: Arc<RecordValidator>,
}

impl IngestProcessor {
    pub fn new(validator: Arc<RecordValidator>) -> Self {
        Self { validator }
    }
}

impl ItemProcessor<Record> for IngestProcessor {
    fn process(&self, record: Record) -> Result<Record> {
        self.validator
            .check(&record)
            .with_context(|| format!("Record rejected ({})", record.key()))?;

        let tagged = Record::new(
            format!("{READ_TAG}{}", record.field1),
            format!("{READ_TAG}{}", record.field2),
            format!("{READ_TAG}{}", record.field3),
        );
        tracing::debug!(record = %tagged, "Record tagged");
        Ok(tagged)
    }
}

/// Inserts each chunk into the store as one unit
pub struct StoreInsertWriter {
    store: Arc<dyn RecordStore>,
}

impl StoreInsertWriter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ItemWriter<Record> for StoreInsertWriter {
    async fn write(&mut self, items: &[Record]) -> Result<()> {
        self.store.insert_records(items).await
    }
}

/// Settings for [`IngestFlow`]
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// File the flow reads
    pub in_flight_file: PathBuf,

    /// Records per chunk
    pub chunk_size: usize,

    /// Field delimiter of the input file
    pub delimiter: u8,
}

/// Reads the in-flight file into the store
pub struct IngestFlow {
    store: Arc<dyn RecordStore>,
    validator: Arc<RecordValidator>,
    settings: IngestSettings,
}

impl IngestFlow {
    pub fn new(
        store: Arc<dyn RecordStore>,
        validator: Arc<RecordValidator>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            store,
            validator,
            settings,
        }
    }
}

#[async_trait]
impl Flow for IngestFlow {
    fn job(&self) -> JobKind {
        JobKind::Ingest
    }

    async fn execute(&self) -> Result<RunOutcome> {
        self.store
            .test_connection()
            .await
            .context("Store unavailable for ingest")?;

        let reader =
            DelimitedFileReader::open(&self.settings.in_flight_file, self.settings.delimiter)?;

        tracing::info!(
            file = %self.settings.in_flight_file.display(),
            chunk_size = self.settings.chunk_size,
            "Starting ingest"
        );

        let pipeline = ChunkedPipeline::builder(JobKind::Ingest.as_str())
            .reader(reader)
            .processor(IngestProcessor::new(self.validator.clone()))
            .writer(StoreInsertWriter::new(self.store.clone()))
            .chunk_size(self.settings.chunk_size)
            .fault_policy(FaultPolicy::AbortOnRecordFailure)
            .listener(Arc::new(ChunkLoggingListener))
            .build()?;

        Ok(pipeline.run().await)
    }
}
