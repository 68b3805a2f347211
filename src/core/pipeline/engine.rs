//! Chunk-oriented pipeline engine
//!
//! Reads up to `chunk_size` items, processes each, then hands the chunk to
//! the writer as one unit. A failure anywhere abandons the current chunk and
//! ends the run; chunks written before it stay written.

use super::fault::FaultPolicy;
use super::listener::StepListener;
use super::outcome::{RunFailure, RunOutcome, StepStatus};
use super::traits::{ItemProcessor, ItemReader, ItemWriter, PassThrough};
use crate::domain::{FerryError, Result};
use std::sync::Arc;

/// A runnable reader → processor → writer pipeline
pub struct ChunkedPipeline<T> {
    name: String,
    reader: Box<dyn ItemReader<T>>,
    processor: Box<dyn ItemProcessor<T>>,
    writer: Box<dyn ItemWriter<T>>,
    chunk_size: usize,
    fault_policy: FaultPolicy,
    listeners: Vec<Arc<dyn StepListener>>,
}

impl<T: Send + Sync + 'static> ChunkedPipeline<T> {
    /// Start building a pipeline named `name`
    pub fn builder(name: impl Into<String>) -> ChunkedPipelineBuilder<T> {
        ChunkedPipelineBuilder::new(name)
    }

    /// Run the pipeline to completion or first failure
    ///
    /// Failures are reported through the returned [`RunOutcome`], never as
    /// an error.
    pub async fn run(mut self) -> RunOutcome {
        for listener in &self.listeners {
            listener.before_step(&self.name);
        }

        let mut outcome = RunOutcome::started();
        let mut chunk_index = 0;

        if let Err(error) = self.run_chunks(&mut outcome, &mut chunk_index).await {
            let failure = RunFailure {
                class: self.fault_policy.classify(&error),
                chunk_index,
                message: error.to_string(),
            };
            for listener in &self.listeners {
                listener.on_failure(&self.name, &failure);
            }
            outcome.status = StepStatus::Failed;
            outcome.failure = Some(failure);
        }

        tracing::info!(
            step = %self.name,
            status = %outcome.status,
            items_read = outcome.items_read,
            items_written = outcome.items_written,
            chunks = outcome.chunks_committed,
            "Step finished"
        );

        for listener in &self.listeners {
            listener.after_step(&self.name, &outcome);
        }

        outcome
    }

    async fn run_chunks(
        &mut self,
        outcome: &mut RunOutcome,
        chunk_index: &mut usize,
    ) -> Result<()> {
        loop {
            let mut chunk = Vec::with_capacity(self.chunk_size);
            let mut exhausted = false;

            while chunk.len() < self.chunk_size {
                match self.reader.read().await? {
                    Some(item) => {
                        outcome.items_read += 1;
                        chunk.push(self.processor.process(item)?);
                    }
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }

            if !chunk.is_empty() {
                self.writer.write(&chunk).await?;
                outcome.items_written += chunk.len();
                outcome.chunks_committed += 1;
                for listener in &self.listeners {
                    listener.after_chunk(&self.name, *chunk_index, chunk.len());
                }
                *chunk_index += 1;
            }

            if exhausted {
                return Ok(());
            }
        }
    }
}

/// Builder for [`ChunkedPipeline`]
pub struct ChunkedPipelineBuilder<T> {
    name: String,
    reader: Option<Box<dyn ItemReader<T>>>,
    processor: Option<Box<dyn ItemProcessor<T>>>,
    writer: Option<Box<dyn ItemWriter<T>>>,
    chunk_size: usize,
    fault_policy: FaultPolicy,
    listeners: Vec<Arc<dyn StepListener>>,
}

impl<T: Send + Sync + 'static> ChunkedPipelineBuilder<T> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 5,
            fault_policy: FaultPolicy::default(),
            listeners: Vec::new(),
        }
    }

    pub fn reader(mut self, reader: impl ItemReader<T> + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    pub fn processor(mut self, processor: impl ItemProcessor<T> + 'static) -> Self {
        self.processor = Some(Box::new(processor));
        self
    }

    pub fn writer(mut self, writer: impl ItemWriter<T> + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    pub fn listener(mut self, listener: Arc<dyn StepListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Build the pipeline
    ///
    /// The processor defaults to [`PassThrough`].
    ///
    /// # Errors
    ///
    /// Returns an error if the reader or writer is missing or the chunk size
    /// is zero.
    pub fn build(self) -> Result<ChunkedPipeline<T>> {
        if self.chunk_size == 0 {
            return Err(FerryError::Pipeline(format!(
                "Step '{}': chunk size must be at least 1",
                self.name
            )));
        }
        let reader = self.reader.ok_or_else(|| {
            FerryError::Pipeline(format!("Step '{}' has no reader", self.name))
        })?;
        let writer = self.writer.ok_or_else(|| {
            FerryError::Pipeline(format!("Step '{}' has no writer", self.name))
        })?;
        let processor = self
            .processor
            .unwrap_or_else(|| Box::new(PassThrough) as Box<dyn ItemProcessor<T>>);

        Ok(ChunkedPipeline {
            name: self.name,
            reader,
            processor,
            writer,
            chunk_size: self.chunk_size,
            fault_policy: self.fault_policy,
            listeners: self.listeners,
        })
    }
}
