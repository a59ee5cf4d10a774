//! Commands, events and the routers that deliver them.
//!
//! - [`CommandRouter`]: one command → the single executor owning its kind
//! - [`CompositeCommandRouter`]: several routers with disjoint coverage as one
//! - [`EventRouter`]: one event → every handler registered for its kind, in order

pub mod command;
pub mod command_router;
pub mod composite;
pub mod envelope;
pub mod event;
pub mod event_router;
pub mod handler;
pub mod registry;

pub use command::Command;
pub use command_router::{CommandRouter, SharedExecutor};
pub use composite::CompositeCommandRouter;
pub use envelope::CommonEvent;
pub use event::Event;
pub use event_router::{EventRouter, SharedHandler};
pub use handler::{CommandExecutor, EventHandler, FnEventHandler, FnExecutor};
pub use registry::{CommandRegistry, EventRegistry};
