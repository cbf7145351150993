use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Item - a JSON object as stored and returned by Base
pub type Item = Map<String, Value>;

/// Name of the identifier field every stored item carries
pub const KEY_FIELD: &str = "key";

/// Reserved field holding an item's expiry as a unix timestamp
pub const EXPIRES_FIELD: &str = "__expires";

/// When a record should expire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Seconds from the moment the record is encoded
    In(u64),
    /// Absolute unix timestamp (seconds)
    At(u64),
}

impl Expiry {
    fn timestamp(&self) -> u64 {
        match self {
            Expiry::At(ts) => *ts,
            Expiry::In(secs) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                now.saturating_add(*secs)
            }
        }
    }
}

/// A document to be written to Base.
///
/// The record's fields are encoded as siblings of `key`:
///
/// ```
/// use dbase_core::Record;
/// use serde_json::json;
///
/// let record = Record::new().with_key("k1").field("a", 1);
/// assert_eq!(record.to_json(), json!({"key": "k1", "a": 1}));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    key: Option<String>,
    data: Item,
    expiry: Option<Expiry>,
}

impl Record {
    /// Create an empty record without a key (the server assigns one)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from a data map
    pub fn from_data(data: Item) -> Self {
        Self {
            key: None,
            data,
            expiry: None,
        }
    }

    /// Create a record from an arbitrary JSON value.
    ///
    /// The value must be an object. A string `key` field is lifted out and
    /// becomes the record key.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut data = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidRecord(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let key = match data.remove(KEY_FIELD) {
            None => None,
            Some(Value::String(key)) => Some(key),
            Some(other) => {
                return Err(Error::InvalidRecord(format!(
                    "key must be a string, got {}",
                    json_type_name(&other)
                )))
            }
        };

        Ok(Self {
            key,
            data,
            expiry: None,
        })
    }

    /// Set the record key. Overrides any `key` field present in the data.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add or replace a field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Expire the record `secs` seconds after it is encoded
    pub fn expire_in(mut self, secs: u64) -> Self {
        self.expiry = Some(Expiry::In(secs));
        self
    }

    /// Expire the record at an absolute unix timestamp
    pub fn expire_at(mut self, timestamp: u64) -> Self {
        self.expiry = Some(Expiry::At(timestamp));
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn data(&self) -> &Item {
        &self.data
    }

    pub fn expiry(&self) -> Option<Expiry> {
        self.expiry
    }

    /// Encode the record into the JSON object the server expects
    pub fn to_json(&self) -> Value {
        let mut object = self.data.clone();
        if let Some(key) = &self.key {
            object.insert(KEY_FIELD.to_string(), Value::String(key.clone()));
        }
        if let Some(expiry) = &self.expiry {
            object.insert(EXPIRES_FIELD.to_string(), Value::from(expiry.timestamp()));
        }
        Value::Object(object)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<Item> for Record {
    fn from(data: Item) -> Self {
        Record::from_data(data)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Record::from_value(value)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
