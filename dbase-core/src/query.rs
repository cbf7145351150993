//! Query filters and query responses
//!
//! A [`Query`] is one AND-ed clause object. Several queries passed together
//! are OR-ed by the server.

use crate::error::{Error, Result};
use crate::types::Item;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Operator suffixes understood by the server (`field?op`)
pub const OPERATORS: &[&str] = &["ne", "lt", "gt", "lte", "gte", "pfx", "r", "contains", "not_contains"];

/// Query builder producing one clause object of the server query language
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    clauses: Item,
}

impl Query {
    /// Create an empty query (matches every item)
    pub fn new() -> Self {
        Self::default()
    }

    fn clause(mut self, field: impl Into<String>, op: Option<&str>, value: Value) -> Self {
        let field = field.into();
        let name = match op {
            Some(op) => format!("{}?{}", field, op),
            None => field,
        };
        self.clauses.insert(name, value);
        self
    }

    /// Field equals value
    pub fn equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, None, value.into())
    }

    /// Field does not equal value
    pub fn not_equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, Some("ne"), value.into())
    }

    pub fn less_than(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, Some("lt"), value.into())
    }

    pub fn less_than_or_equal(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, Some("lte"), value.into())
    }

    pub fn greater_than(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, Some("gt"), value.into())
    }

    pub fn greater_than_or_equal(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, Some("gte"), value.into())
    }

    /// String field starts with prefix
    pub fn prefix(self, field: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.clause(field, Some("pfx"), Value::String(prefix.into()))
    }

    /// Field lies in the inclusive range `[start, end]`
    pub fn range(
        self,
        field: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        self.clause(field, Some("r"), Value::Array(vec![start.into(), end.into()]))
    }

    /// String or list field contains value
    pub fn contains(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, Some("contains"), value.into())
    }

    /// String or list field does not contain value
    pub fn not_contains(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clause(field, Some("not_contains"), value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check that every clause names a field and a known operator
    pub fn validate(&self) -> Result<()> {
        for name in self.clauses.keys() {
            let (field, op) = match name.split_once('?') {
                Some((field, op)) => (field, Some(op)),
                None => (name.as_str(), None),
            };
            if field.is_empty() {
                return Err(Error::InvalidQuery(format!(
                    "clause '{}' has an empty field name",
                    name
                )));
            }
            if let Some(op) = op {
                if !OPERATORS.contains(&op) {
                    return Err(Error::InvalidQuery(format!(
                        "clause '{}' uses unknown operator '{}'",
                        name, op
                    )));
                }
            }
        }
        Ok(())
    }

    /// Encode into one clause object
    pub fn to_json(&self) -> Value {
        Value::Object(self.clauses.clone())
    }
}

impl Serialize for Query {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.clauses.serialize(serializer)
    }
}

/// Raw clause object, e.g. `{"age?gt": 20}`
impl From<Item> for Query {
    fn from(clauses: Item) -> Self {
        Self { clauses }
    }
}

/// Body of a filtered query request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: Vec<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

impl QueryRequest {
    pub fn new(queries: Vec<Query>) -> Self {
        Self {
            query: queries,
            limit: None,
            last: None,
        }
    }

    /// Set the maximum number of items to return
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Continue after a previous page's continuation token
    pub fn last(mut self, last: impl Into<String>) -> Self {
        self.last = Some(last.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(Error::InvalidArgument("limit must be greater than 0".to_string()));
        }
        self.query.iter().try_for_each(Query::validate)
    }
}

/// Pagination block of a query response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paging {
    /// Number of items in this page
    #[serde(default)]
    pub size: usize,
    /// Continuation token, present when more results exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paging: Paging,
}

impl QueryPage {
    /// Continuation token for the next page; an empty token ends the walk
    pub fn continuation(&self) -> Option<&str> {
        self.paging.last.as_deref().filter(|last| !last.is_empty())
    }
}

/// Treat an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
