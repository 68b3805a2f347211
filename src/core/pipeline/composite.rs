//! Fan-out writer

use super::traits::ItemWriter;
use crate::domain::Result;
use async_trait::async_trait;

/// Hands every chunk to each delegate in order
///
/// All delegates are attempted even after one fails; the first error is
/// returned. A failed chunk can therefore be partially applied across
/// delegates.
pub struct CompositeWriter<T> {
    delegates: Vec<Box<dyn ItemWriter<T>>>,
}

impl<T: Send + Sync + 'static> CompositeWriter<T> {
    pub fn new() -> Self {
        Self {
            delegates: Vec::new(),
        }
    }

    /// Append a delegate
    pub fn with(mut self, writer: impl ItemWriter<T> + 'static) -> Self {
        self.delegates.push(Box::new(writer));
        self
    }
}

impl<T: Send + Sync + 'static> Default for CompositeWriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> ItemWriter<T> for CompositeWriter<T> {
    async fn write(&mut self, items: &[T]) -> Result<()> {
        let mut first_error = None;
        for (index, delegate) in self.delegates.iter_mut().enumerate() {
            if let Err(e) = delegate.write(items).await {
                tracing::warn!(delegate = index, error = %e, "Composite delegate failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
