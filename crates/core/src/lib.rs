//! `cqrskit-core` - shared building blocks.
//!
//! Names, identifiers, the error taxonomy and result envelopes. No routing and no IO.

pub mod error;
pub mod id;
pub mod kind;
pub mod result;

pub use error::{CommandError, CommandOutcome, DomainError, DomainResult, HandlerError, RegistryError};
pub use id::EventId;
pub use kind::{KindId, StreamName};
pub use result::{CommandResult, ResultType};
