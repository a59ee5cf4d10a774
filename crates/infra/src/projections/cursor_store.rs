//! Projection cursor persistence.
//!
//! A position store records, per stream, the next position a projection has
//! not yet applied. This enables:
//! - resume after a crash (catch-up continues from the stored position)
//! - cheap idempotent catch-up (nothing new means nothing read twice)
//! - rebuilds (reset to 0 and replay the whole stream)

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use cqrskit_core::StreamName;

#[derive(Debug, Error)]
pub enum PositionStoreError {
    #[error("position store backend failure: {0}")]
    Backend(String),
}

/// Durable "next unread position" per stream.
pub trait PositionStore: Send + Sync {
    /// Stored position for `stream`, or 0 if none was ever written.
    fn read_position(&self, stream: &StreamName) -> Result<u64, PositionStoreError>;

    fn write_position(&self, stream: &StreamName, position: u64) -> Result<(), PositionStoreError>;

    /// Forget the stored position so the next catch-up starts from 0.
    fn reset_position(&self, stream: &StreamName) -> Result<(), PositionStoreError>;
}

impl<S> PositionStore for std::sync::Arc<S>
where
    S: PositionStore + ?Sized,
{
    fn read_position(&self, stream: &StreamName) -> Result<u64, PositionStoreError> {
        (**self).read_position(stream)
    }

    fn write_position(&self, stream: &StreamName, position: u64) -> Result<(), PositionStoreError> {
        (**self).write_position(stream, position)
    }

    fn reset_position(&self, stream: &StreamName) -> Result<(), PositionStoreError> {
        (**self).reset_position(stream)
    }
}

/// In-memory position store (tests/dev).
///
/// Counts writes so callers can check that unchanged cursors are not rewritten.
#[derive(Debug, Default)]
pub struct InMemoryPositionStore {
    positions: RwLock<HashMap<StreamName, u64>>,
    writes: AtomicUsize,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write_position` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PositionStore for InMemoryPositionStore {
    fn read_position(&self, stream: &StreamName) -> Result<u64, PositionStoreError> {
        let positions = self
            .positions
            .read()
            .map_err(|_| PositionStoreError::Backend("lock poisoned".to_string()))?;
        Ok(positions.get(stream).copied().unwrap_or(0))
    }

    fn write_position(&self, stream: &StreamName, position: u64) -> Result<(), PositionStoreError> {
        let mut positions = self
            .positions
            .write()
            .map_err(|_| PositionStoreError::Backend("lock poisoned".to_string()))?;
        positions.insert(stream.clone(), position);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reset_position(&self, stream: &StreamName) -> Result<(), PositionStoreError> {
        let mut positions = self
            .positions
            .write()
            .map_err(|_| PositionStoreError::Backend("lock poisoned".to_string()))?;
        positions.remove(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stream_reads_zero() {
        let store = InMemoryPositionStore::new();
        assert_eq!(store.read_position(&StreamName::from_static("s")).unwrap(), 0);
    }

    #[test]
    fn write_then_read_and_reset() {
        let store = InMemoryPositionStore::new();
        let s = StreamName::from_static("s");

        store.write_position(&s, 7).unwrap();
        assert_eq!(store.read_position(&s).unwrap(), 7);
        assert_eq!(store.write_count(), 1);

        store.reset_position(&s).unwrap();
        assert_eq!(store.read_position(&s).unwrap(), 0);
    }

    #[test]
    fn streams_are_independent() {
        let store = InMemoryPositionStore::new();
        store.write_position(&StreamName::from_static("a"), 3).unwrap();
        assert_eq!(store.read_position(&StreamName::from_static("b")).unwrap(), 0);
    }
}
