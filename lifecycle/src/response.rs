//! Configuration payload handed to modules
//!
//! A [`Response`] is a JSON object. The scheduler fetches one per round and
//! gives every module the nested object stored under its name. Keys are
//! matched case-insensitively and a missing key yields an empty payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response {
    data: Map<String, Value>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Anything other than an object becomes an empty payload.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Look up a key, preferring an exact match over a case-insensitive one.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).or_else(|| {
            self.data
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// String field, or `None` when absent or not a string.
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Payload stored under `name`; empty when missing or not an object.
    pub fn get_sub_response(&self, name: &str) -> Response {
        match self.get(name) {
            Some(Value::Object(data)) => Response { data: data.clone() },
            _ => Response::default(),
        }
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
