//! Raw record → typed event.
//!
//! There is no discovery: each kind the decoder understands is registered
//! explicitly together with the payload type it deserializes into.
//!
//! ```ignore
//! let mut decoder = JsonEventDecoder::<AccountEvent>::new();
//! decoder.register::<Opened>(KindId::from_static("Opened"))?;
//! decoder.register::<Closed>(KindId::from_static("Closed"))?;
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use cqrskit_core::KindId;

use crate::event_store::RawRecord;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no decoder registered for kind '{kind}' (position {position})")]
    UnknownKind { kind: KindId, position: u64 },

    #[error("malformed '{kind}' payload at position {position}: {source}")]
    Malformed {
        kind: KindId,
        position: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("kind '{0}' is already registered")]
    AlreadyRegistered(KindId),
}

/// Turns stored records into events of type `E`.
pub trait EventDecoder<E>: Send + Sync {
    fn decode(&self, record: &RawRecord) -> Result<E, DecodeError>;
}

type DecodeFn<E> = Box<dyn Fn(JsonValue) -> Result<E, serde_json::Error> + Send + Sync>;

/// JSON decoder driven by an explicit kind → payload type registry.
pub struct JsonEventDecoder<E> {
    decoders: HashMap<KindId, DecodeFn<E>>,
}

impl<E> Default for JsonEventDecoder<E> {
    fn default() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }
}

impl<E: 'static> JsonEventDecoder<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode records of `kind` as `T`, then convert into `E`.
    pub fn register<T>(&mut self, kind: KindId) -> Result<&mut Self, DecodeError>
    where
        T: DeserializeOwned + Into<E> + 'static,
    {
        if self.decoders.contains_key(&kind) {
            return Err(DecodeError::AlreadyRegistered(kind));
        }
        self.decoders.insert(
            kind,
            Box::new(|payload: JsonValue| serde_json::from_value::<T>(payload).map(Into::into)),
        );
        Ok(self)
    }

    pub fn knows(&self, kind: &KindId) -> bool {
        self.decoders.contains_key(kind)
    }
}

impl<E> EventDecoder<E> for JsonEventDecoder<E> {
    fn decode(&self, record: &RawRecord) -> Result<E, DecodeError> {
        let decode = self.decoders.get(&record.kind).ok_or_else(|| DecodeError::UnknownKind {
            kind: record.kind.clone(),
            position: record.position,
        })?;

        decode(record.payload.clone()).map_err(|source| DecodeError::Malformed {
            kind: record.kind.clone(),
            position: record.position,
            source,
        })
    }
}

impl<E> core::fmt::Debug for JsonEventDecoder<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut kinds: Vec<&KindId> = self.decoders.keys().collect();
        kinds.sort();
        f.debug_struct("JsonEventDecoder").field("kinds", &kinds).finish()
    }
}
