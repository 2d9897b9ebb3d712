//! Opaque configuration payloads.
//!
//! A payload received over the wire is kept as the exact JSON text the admin
//! sent: big integers, decimal spelling and key order all survive storage and
//! come back unchanged. Validators work on a parsed [`Value`] view.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A configuration payload. Cheap to clone.
#[derive(Clone)]
pub struct Payload(Repr);

#[derive(Clone)]
enum Repr {
    /// Verbatim JSON text.
    Raw(Arc<RawValue>),
    /// Built in process (defaults, tests).
    Value(Arc<Value>),
}

impl Payload {
    /// Wrap JSON text without reformatting it.
    pub fn from_json(text: String) -> Result<Self, serde_json::Error> {
        RawValue::from_string(text).map(|raw| Self(Repr::Raw(Arc::from(raw))))
    }

    /// The structured view validators inspect.
    ///
    /// Fails when the text nests deeper than serde_json parses.
    pub fn to_value(&self) -> Result<Cow<'_, Value>, serde_json::Error> {
        match &self.0 {
            Repr::Raw(raw) => serde_json::from_str(raw.get()).map(Cow::Owned),
            Repr::Value(value) => Ok(Cow::Borrowed(value)),
        }
    }

    /// The JSON text as stored and served.
    pub fn json(&self) -> Cow<'_, str> {
        match &self.0 {
            Repr::Raw(raw) => Cow::Borrowed(raw.get()),
            Repr::Value(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self(Repr::Value(Arc::new(value)))
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.json() == other.json()
    }
}

impl PartialEq<Value> for Payload {
    fn eq(&self, other: &Value) -> bool {
        self.to_value().is_ok_and(|value| *value == *other)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({})", self.json())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.json())
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Repr::Raw(raw) => raw.serialize(serializer),
            Repr::Value(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Box::<RawValue>::deserialize(deserializer).map(|raw| Self(Repr::Raw(Arc::from(raw))))
    }
}
