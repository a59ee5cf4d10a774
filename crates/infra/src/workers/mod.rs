//! Background workers driving projections.

pub mod catch_up_worker;

pub use catch_up_worker::{CatchUpWorker, Tick, WorkerHandle};
