//! Event fan-out.
//!
//! An [`EventRouter`] hands each event to every handler registered for its
//! kind, in registration order. Events nobody listens to are dropped.
//!
//! Delivery is fail-fast and not transactional: if the second of three
//! handlers fails, the first has already applied its side effects and the third
//! never sees the event. Callers that need a retry (the stream projector) replay
//! from an earlier position, which is why handlers must be idempotent.

use std::sync::Arc;

use tracing::trace;

use cqrskit_core::{HandlerError, KindId, RegistryError};

use crate::registry::EventRegistry;
use crate::{CommonEvent, Event, EventHandler};

/// Handler shared behind a trait object.
pub type SharedHandler<E> = Arc<dyn EventHandler<E>>;

pub struct EventRouter<E: ?Sized> {
    registry: EventRegistry<SharedHandler<E>>,
}

impl<E: ?Sized> EventRouter<E> {
    pub fn new(handlers: impl IntoIterator<Item = SharedHandler<E>>) -> Result<Self, RegistryError> {
        Self::from_slots(handlers.into_iter().map(Some))
    }

    /// Build from handler slots; an unset slot fails with `NullEntry`.
    pub fn from_slots(handlers: impl IntoIterator<Item = Option<SharedHandler<E>>>) -> Result<Self, RegistryError> {
        let registry = EventRegistry::build("handlers", handlers, |h: &SharedHandler<E>| EventHandler::kind(&**h))?;
        Ok(Self { registry })
    }

    /// Kinds with at least one handler, sorted.
    pub fn kinds(&self) -> Vec<KindId> {
        self.registry.kinds()
    }

    pub fn handler_count(&self) -> usize {
        self.registry.handler_count()
    }
}

impl<E: Event + ?Sized> EventRouter<E> {
    /// Deliver one event to each of its handlers, stopping at the first failure.
    pub fn dispatch_one(&self, event: &E) -> Result<(), HandlerError> {
        let kind = event.kind();
        let handlers = self.registry.resolve(&kind);
        if handlers.is_empty() {
            trace!(kind = %kind, "no handler for event, dropped");
            return Ok(());
        }

        for handler in handlers {
            handler.handle(event)?;
        }
        Ok(())
    }

    /// Deliver events in order. Events before a failing one stay applied.
    pub fn dispatch_many<'a, I>(&self, events: I) -> Result<(), HandlerError>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        for event in events {
            self.dispatch_one(event)?;
        }
        Ok(())
    }
}

impl<E: Event> EventRouter<E> {
    /// Unwrap decoded envelopes and deliver their events in order.
    pub fn dispatch_decoded(&self, envelopes: &[CommonEvent<E>]) -> Result<(), HandlerError> {
        self.dispatch_many(envelopes.iter().map(CommonEvent::data))
    }
}

impl<E: ?Sized> core::fmt::Debug for EventRouter<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventRouter")
            .field("kinds", &self.kinds())
            .field("handlers", &self.handler_count())
            .finish()
    }
}
