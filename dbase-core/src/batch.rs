//! Batch write results and chunking

use crate::error::{Error, Result};
use crate::query::null_as_default;
use crate::types::Item;
use serde::{Deserialize, Serialize};

/// Maximum number of items the server accepts in one write request
pub const MAX_BATCH_SIZE: usize = 25;

/// A list of items wrapped as `{"items": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
}

/// Outcome of a batch write.
///
/// Both a single write response and the merge of several chunk responses
/// have this shape. Missing or `null` sections decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed: ItemList,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed: ItemList,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another result's items after this one's
    pub fn merge(&mut self, other: BatchResult) {
        self.processed.items.extend(other.processed.items);
        self.failed.items.extend(other.failed.items);
    }

    pub fn processed(&self) -> &[Item] {
        &self.processed.items
    }

    pub fn failed(&self) -> &[Item] {
        &self.failed.items
    }

    /// True when the server rejected none of the items
    pub fn is_complete(&self) -> bool {
        self.failed.items.is_empty()
    }
}

impl FromIterator<BatchResult> for BatchResult {
    fn from_iter<I: IntoIterator<Item = BatchResult>>(iter: I) -> Self {
        iter.into_iter().fold(BatchResult::new(), |mut acc, result| {
            acc.merge(result);
            acc
        })
    }
}

/// Split items into contiguous chunks of at most `size`, preserving order
pub fn chunk<T>(items: &[T], size: usize) -> Result<Vec<&[T]>> {
    if size == 0 || size > MAX_BATCH_SIZE {
        return Err(Error::InvalidArgument(format!(
            "batch size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, size
        )));
    }
    Ok(items.chunks(size).collect())
}
