//! Human-readable names: command/event kinds and stream names.

use core::str::FromStr;
use std::borrow::Borrow;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// Unique name of a command or event shape (e.g. `"CustomerCreated"`).
///
/// Equality is structural. The value is never empty and cannot change once
/// constructed; clones share the same allocation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KindId(Arc<str>);

/// Name of an append-only event stream (e.g. `"customers"`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamName(Arc<str>);

macro_rules! impl_name_newtype {
    ($t:ident, $name:literal) => {
        impl $t {
            /// Create a name, rejecting empty or blank input.
            pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
                let value = value.as_ref();
                if value.trim().is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                Ok(Self(Arc::from(value)))
            }

            /// Create a name from a compile-time constant.
            ///
            /// Panics on an empty literal; only use with known-good constants.
            pub fn from_static(value: &'static str) -> Self {
                match Self::new(value) {
                    Ok(v) => v,
                    Err(e) => panic!("{e}"),
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Debug for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({:?})", $name, &*self.0)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<&str> for $t {
            type Error = DomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl Serialize for $t {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_name_newtype!(KindId, "KindId");
impl_name_newtype!(StreamName, "StreamName");
