//! Reader, processor and writer seams of the chunked pipeline
//!
//! A pipeline is assembled from one of each. Readers and writers talk to
//! files or the store and are async; processors are pure transformations.

use crate::domain::Result;
use async_trait::async_trait;

/// Produces items one at a time until the source is exhausted
#[async_trait]
pub trait ItemReader<T: Send>: Send {
    /// Read the next item, or `None` once the source is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or an item cannot be
    /// built from it.
    async fn read(&mut self) -> Result<Option<T>>;
}

/// Transforms a single item
pub trait ItemProcessor<T>: Send + Sync {
    /// Process one item, returning the item to hand to the writer
    ///
    /// # Errors
    ///
    /// Returns an error if the item is rejected.
    fn process(&self, item: T) -> Result<T>;
}

/// Writes a whole chunk as one unit
#[async_trait]
pub trait ItemWriter<T: Send + Sync>: Send {
    /// Write every item of `items`
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk could not be written. Implementations
    /// backed by a transactional store write nothing in that case.
    async fn write(&mut self, items: &[T]) -> Result<()>;
}

/// Passes items through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<T> ItemProcessor<T> for PassThrough {
    fn process(&self, item: T) -> Result<T> {
        Ok(item)
    }
}

/// Reads from an in-memory sequence
pub struct IterReader<T> {
    items: std::vec::IntoIter<T>,
}

impl<T> IterReader<T> {
    /// Create a reader over `items`, yielded in order
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

#[async_trait]
impl<T: Send> ItemReader<T> for IterReader<T> {
    async fn read(&mut self) -> Result<Option<T>> {
        Ok(self.items.next())
    }
}
