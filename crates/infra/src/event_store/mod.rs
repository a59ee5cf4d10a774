//! Append-only event store boundary (read path).
//!
//! The projector only ever reads forward through a named stream in pages; how
//! records are appended and stored is up to the implementation.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use r#trait::{EventStoreError, RawRecord, ReadableEventStore, StreamPage};
