//! Projections: replaying event streams into read models.
//!
//! All projections here are:
//! - **Rebuildable**: the view can be reconstructed from the stream alone
//! - **Resumable**: progress is a stored cursor per stream
//! - **At-least-once**: handlers may see an event again after a failed pass

pub mod cursor_store;
pub mod projector;

pub use cursor_store::{InMemoryPositionStore, PositionStore, PositionStoreError};
pub use projector::{CatchUpReport, ProjectionError, ProjectorState, StreamProjector};
