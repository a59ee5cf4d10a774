use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cqrskit_core::{EventId, KindId};

/// A decoded stream record: the typed event plus where it was read from.
///
/// This is what a projector hands to [`EventRouter::dispatch_decoded`]; the
/// router only ever looks at `data`.
///
/// Notes:
/// - `position` is the record's offset in its stream (0-based).
/// - `kind` is the kind recorded by the store, which should match `data.kind()`.
///
/// [`EventRouter::dispatch_decoded`]: crate::EventRouter::dispatch_decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonEvent<E> {
    event_id: EventId,
    kind: KindId,
    position: u64,
    recorded_at: DateTime<Utc>,
    data: E,
}

impl<E> CommonEvent<E> {
    pub fn new(
        event_id: EventId,
        kind: KindId,
        position: u64,
        recorded_at: DateTime<Utc>,
        data: E,
    ) -> Self {
        Self {
            event_id,
            kind,
            position,
            recorded_at,
            data,
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn kind(&self) -> &KindId {
        &self.kind
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn data(&self) -> &E {
        &self.data
    }

    pub fn into_data(self) -> E {
        self.data
    }
}
