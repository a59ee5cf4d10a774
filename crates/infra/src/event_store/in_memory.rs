use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;

use cqrskit_core::{EventId, KindId, StreamName};
use cqrskit_events::Event;

use super::r#trait::{EventStoreError, RawRecord, ReadableEventStore, StreamPage};

#[derive(Debug, Default)]
struct Stream {
    records: Vec<RawRecord>,
    deleted: bool,
}

/// In-memory append-only event store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<StreamName, Stream>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw payload; returns the position it was stored at.
    ///
    /// Appending to a deleted stream fails with `StreamDeleted`.
    pub fn append_raw(&self, stream: &StreamName, kind: KindId, payload: JsonValue) -> Result<u64, EventStoreError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| EventStoreError::Backend("lock poisoned".to_string()))?;

        let entry = streams.entry(stream.clone()).or_default();
        if entry.deleted {
            return Err(EventStoreError::StreamDeleted(stream.clone()));
        }

        let position = entry.records.len() as u64;
        entry.records.push(RawRecord {
            event_id: EventId::new(),
            kind,
            position,
            recorded_at: Utc::now(),
            payload,
        });
        Ok(position)
    }

    /// Serialize a typed event and append it under its own kind.
    pub fn append<E>(&self, stream: &StreamName, event: &E) -> Result<u64, EventStoreError>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event)
            .map_err(|e| EventStoreError::Backend(format!("payload serialization failed: {e}")))?;
        self.append_raw(stream, event.kind(), payload)
    }

    /// Mark a stream deleted. Later reads fail with `StreamDeleted`.
    pub fn delete_stream(&self, stream: &StreamName) -> Result<(), EventStoreError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| EventStoreError::Backend("lock poisoned".to_string()))?;

        match streams.get_mut(stream) {
            Some(s) => {
                s.deleted = true;
                Ok(())
            }
            None => Err(EventStoreError::StreamNotFound(stream.clone())),
        }
    }

    /// Number of records in the stream (0 for unknown streams).
    pub fn stream_len(&self, stream: &StreamName) -> usize {
        self.streams
            .read()
            .map(|s| s.get(stream).map(|s| s.records.len()).unwrap_or(0))
            .unwrap_or(0)
    }
}

impl ReadableEventStore for InMemoryEventStore {
    fn read_forward(&self, stream: &StreamName, from: u64, max_count: usize) -> Result<StreamPage, EventStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| EventStoreError::Backend("lock poisoned".to_string()))?;

        let s = streams
            .get(stream)
            .ok_or_else(|| EventStoreError::StreamNotFound(stream.clone()))?;
        if s.deleted {
            return Err(EventStoreError::StreamDeleted(stream.clone()));
        }

        let total = s.records.len() as u64;
        let start = from.min(total) as usize;
        let end = start.saturating_add(max_count).min(s.records.len());
        let records = s.records[start..end].to_vec();
        let next_position = if records.is_empty() { from } else { end as u64 };

        Ok(StreamPage {
            records,
            next_position,
            end_of_stream: next_position >= total,
        })
    }
}
