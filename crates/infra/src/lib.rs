//! Infrastructure layer: event store and position store boundaries, decoding,
//! stream projection and the workers that drive it.

pub mod config;
pub mod decoder;
pub mod event_store;
pub mod projections;
pub mod workers;


pub use config::{ConfigError, ProjectorConfig, WorkerConfig};
pub use decoder::{DecodeError, EventDecoder, JsonEventDecoder};
pub use event_store::{EventStoreError, InMemoryEventStore, RawRecord, ReadableEventStore, StreamPage};
pub use projections::{
    CatchUpReport, InMemoryPositionStore, PositionStore, PositionStoreError, ProjectionError, ProjectorState,
    StreamProjector,
};
pub use workers::{CatchUpWorker, Tick, WorkerHandle};
