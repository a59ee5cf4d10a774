use std::sync::Arc;

use cqrskit_core::{EventId, KindId};

/// A domain event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - tagged with exactly one **kind**, which is all routing looks at
/// - optionally **linked** to the events that correlate with or caused them;
///   the links are for tracing only and play no part in dispatch
pub trait Event: core::fmt::Debug + Send + Sync {
    /// Stable event kind (e.g. `"AccountOpened"`).
    fn kind(&self) -> KindId;

    /// Unique identifier of this event, if it carries one.
    fn event_id(&self) -> Option<EventId> {
        None
    }

    /// Event that started the conversation this event belongs to.
    fn correlation_id(&self) -> Option<EventId> {
        None
    }

    /// Event that directly caused this one.
    fn causation_id(&self) -> Option<EventId> {
        None
    }
}

impl<T> Event for Box<T>
where
    T: Event + ?Sized,
{
    fn kind(&self) -> KindId {
        (**self).kind()
    }

    fn event_id(&self) -> Option<EventId> {
        (**self).event_id()
    }

    fn correlation_id(&self) -> Option<EventId> {
        (**self).correlation_id()
    }

    fn causation_id(&self) -> Option<EventId> {
        (**self).causation_id()
    }
}

impl<T> Event for Arc<T>
where
    T: Event + ?Sized,
{
    fn kind(&self) -> KindId {
        (**self).kind()
    }

    fn event_id(&self) -> Option<EventId> {
        (**self).event_id()
    }

    fn correlation_id(&self) -> Option<EventId> {
        (**self).correlation_id()
    }

    fn causation_id(&self) -> Option<EventId> {
        (**self).causation_id()
    }
}
