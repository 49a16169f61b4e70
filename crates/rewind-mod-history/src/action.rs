/// Action records dispatched into reducers.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A command with a `kind` and arbitrary payload fields.
///
/// Payload fields are flattened next to `kind` when serialized, so an
/// action reads as `{"kind": "rename", "name": "Bill 2"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Action {
    /// Creates an action with no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// Adds a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Looks up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Looks up a string payload field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }

    /// Returns a copy carrying only the kind.
    pub fn slim(&self) -> Self {
        Self::new(self.kind.clone())
    }
}
