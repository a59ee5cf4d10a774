use std::sync::Arc;

use cqrskit_core::KindId;

/// A command names the behaviour it requests through its kind (command abstraction).
///
/// Commands represent **intent** - a request to perform an action. They are
/// transient, immutable once built, and never mutated by a router.
///
/// ## Routing
///
/// Routers only ever look at `kind()`. Everything else in a command is the
/// business of the executor that owns that kind; validating the command's fields
/// happens before dispatch, outside this crate.
///
/// ## Command vs Event
///
/// - **Command**: Intent to do something (e.g., "Open account")
/// - **Event**: Fact that something happened (e.g., "AccountOpened")
pub trait Command: core::fmt::Debug + Send + Sync {
    /// Kind of this command (e.g. `"OpenAccount"`).
    fn kind(&self) -> KindId;
}

impl<T> Command for Box<T>
where
    T: Command + ?Sized,
{
    fn kind(&self) -> KindId {
        (**self).kind()
    }
}

impl<T> Command for Arc<T>
where
    T: Command + ?Sized,
{
    fn kind(&self) -> KindId {
        (**self).kind()
    }
}
