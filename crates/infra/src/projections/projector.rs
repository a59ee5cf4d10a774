//! Incremental stream → view projection.
//!
//! A [`StreamProjector`] replays one named stream into a view, page by page,
//! starting from the position stored in a [`PositionStore`]:
//!
//! ```text
//! read_position ─▶ read_forward(cursor, page_size) ─▶ decode page ─▶ EventRouter ─▶ write_position
//!                       ▲                                                              │
//!                       └──────────────────────── until end of stream ─────────────────┘
//! ```
//!
//! ## Delivery guarantees
//!
//! - A page is decoded completely before any of its events reach a handler.
//! - The cursor is written only after every event of the page was routed, so a
//!   failing pass replays the page on the next run (at-least-once). Handlers
//!   must therefore be idempotent.
//! - The cursor never moves backwards; a store returning a lower next position
//!   fails the pass with [`ProjectionError::NonMonotonicCursor`].
//! - A page carrying records must move the cursor; one that does not fails the
//!   pass with [`ProjectionError::StalledPage`] before anything is applied. An
//!   empty page that does not move the cursor ends the pass.
//! - An unchanged cursor is not written again.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use cqrskit_core::{HandlerError, StreamName};
use cqrskit_events::{CommonEvent, Event, EventRouter};

use crate::config::{ConfigError, ProjectorConfig};
use crate::decoder::{DecodeError, EventDecoder};
use crate::event_store::{EventStoreError, RawRecord, ReadableEventStore};
use crate::projections::cursor_store::{PositionStore, PositionStoreError};

/// Where a projector is in its catch-up cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectorState {
    Idle,
    Reading,
    Applying,
    Persisting,
    /// The last pass failed; the next `catch_up` starts over from the stored cursor.
    Failed,
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("stream '{stream}' is unavailable: {source}")]
    StreamUnavailable {
        stream: StreamName,
        #[source]
        source: EventStoreError,
    },

    #[error("event store failure on '{stream}': {source}")]
    Store {
        stream: StreamName,
        #[source]
        source: EventStoreError,
    },

    #[error("decoding failed on '{stream}': {source}")]
    Decode {
        stream: StreamName,
        #[source]
        source: DecodeError,
    },

    #[error("handler failed on '{stream}' in page starting at {from}: {source}")]
    Handler {
        stream: StreamName,
        from: u64,
        #[source]
        source: HandlerError,
    },

    #[error("position store failure on '{stream}': {source}")]
    Position {
        stream: StreamName,
        #[source]
        source: PositionStoreError,
    },

    #[error("stream '{stream}' moved cursor backwards ({cursor} -> {next})")]
    NonMonotonicCursor { stream: StreamName, cursor: u64, next: u64 },

    #[error("stream '{stream}' returned {records} records without advancing past {cursor}")]
    StalledPage { stream: StreamName, cursor: u64, records: usize },
}

impl ProjectionError {
    fn from_store(stream: &StreamName, source: EventStoreError) -> Self {
        match source {
            EventStoreError::StreamNotFound(_) | EventStoreError::StreamDeleted(_) => Self::StreamUnavailable {
                stream: stream.clone(),
                source,
            },
            EventStoreError::Backend(_) => Self::Store {
                stream: stream.clone(),
                source,
            },
        }
    }

    fn position(stream: &StreamName, source: PositionStoreError) -> Self {
        Self::Position {
            stream: stream.clone(),
            source,
        }
    }
}

/// Outcome of one successful catch-up pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchUpReport {
    pub pages_read: usize,
    /// Events handed to the router (including kinds nobody handles).
    pub events_applied: usize,
    pub start_position: u64,
    pub final_position: u64,
}

impl CatchUpReport {
    pub fn cursor_moved(&self) -> bool {
        self.final_position != self.start_position
    }
}

/// Replays one stream into a view through an [`EventRouter`].
pub struct StreamProjector<E> {
    config: ProjectorConfig,
    store: Arc<dyn ReadableEventStore>,
    positions: Arc<dyn PositionStore>,
    decoder: Arc<dyn EventDecoder<E>>,
    router: EventRouter<E>,
    state: ProjectorState,
}

impl<E: Event> StreamProjector<E> {
    /// Fails if `config` is invalid (e.g. a zero page size).
    pub fn new(
        config: ProjectorConfig,
        store: Arc<dyn ReadableEventStore>,
        positions: Arc<dyn PositionStore>,
        decoder: Arc<dyn EventDecoder<E>>,
        router: EventRouter<E>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            positions,
            decoder,
            router,
            state: ProjectorState::Idle,
        })
    }

    pub fn state(&self) -> ProjectorState {
        self.state
    }

    pub fn stream(&self) -> &StreamName {
        &self.config.stream
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// The stored cursor for this projector's stream.
    pub fn position(&self) -> Result<u64, ProjectionError> {
        self.positions
            .read_position(&self.config.stream)
            .map_err(|e| ProjectionError::position(&self.config.stream, e))
    }

    /// Apply everything appended since the stored cursor.
    ///
    /// Running it again with nothing new reads one empty page and writes nothing.
    pub fn catch_up(&mut self) -> Result<CatchUpReport, ProjectionError> {
        let result = self.run_pass();
        self.state = match result {
            Ok(_) => ProjectorState::Idle,
            Err(_) => ProjectorState::Failed,
        };
        result
    }

    /// Reset the cursor to 0, clear the view, then replay the whole stream.
    pub fn rebuild(&mut self, clear_view: impl FnOnce()) -> Result<CatchUpReport, ProjectionError> {
        let stream = self.config.stream.clone();
        if let Err(e) = self.positions.reset_position(&stream) {
            self.state = ProjectorState::Failed;
            return Err(ProjectionError::position(&stream, e));
        }
        debug!(stream = %stream, "position reset, clearing view");
        clear_view();
        self.catch_up()
    }

    fn run_pass(&mut self) -> Result<CatchUpReport, ProjectionError> {
        let stream = self.config.stream.clone();
        let page_size = self.config.page_size;

        let start = self.position()?;
        let mut cursor = start;
        let mut pages_read = 0usize;
        let mut events_applied = 0usize;

        loop {
            self.state = ProjectorState::Reading;
            let page = self
                .store
                .read_forward(&stream, cursor, page_size)
                .map_err(|e| ProjectionError::from_store(&stream, e))?;
            pages_read += 1;
            debug!(
                stream = %stream,
                from = cursor,
                records = page.len(),
                next = page.next_position,
                end_of_stream = page.end_of_stream,
                "read page"
            );

            if page.next_position < cursor {
                return Err(ProjectionError::NonMonotonicCursor {
                    stream,
                    cursor,
                    next: page.next_position,
                });
            }
            if !page.is_empty() && page.next_position == cursor {
                return Err(ProjectionError::StalledPage {
                    stream,
                    cursor,
                    records: page.len(),
                });
            }

            let events = page
                .records
                .iter()
                .map(|r| self.decode(r))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ProjectionError::Decode {
                    stream: stream.clone(),
                    source,
                })?;

            self.state = ProjectorState::Applying;
            self.router
                .dispatch_decoded(&events)
                .map_err(|source| ProjectionError::Handler {
                    stream: stream.clone(),
                    from: cursor,
                    source,
                })?;
            events_applied += events.len();

            let progressed = page.next_position != cursor;
            if progressed {
                self.state = ProjectorState::Persisting;
                self.positions
                    .write_position(&stream, page.next_position)
                    .map_err(|e| ProjectionError::position(&stream, e))?;
                debug!(stream = %stream, position = page.next_position, "cursor persisted");
                cursor = page.next_position;
            }

            // Only an empty page can get here without progress.
            if page.end_of_stream || !progressed {
                break;
            }
        }

        Ok(CatchUpReport {
            pages_read,
            events_applied,
            start_position: start,
            final_position: cursor,
        })
    }

    fn decode(&self, record: &RawRecord) -> Result<CommonEvent<E>, DecodeError> {
        let event = self.decoder.decode(record)?;
        Ok(CommonEvent::new(
            record.event_id,
            record.kind.clone(),
            record.position,
            record.recorded_at,
            event,
        ))
    }
}

impl<E> core::fmt::Debug for StreamProjector<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamProjector")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}
