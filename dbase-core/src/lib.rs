//! Value types for the Deta Base SDK
//!
//! Records, queries and updaters are pure data-to-JSON mappers; batch and
//! query results decode the server's response shapes.

pub mod error;
pub mod types;
pub mod query;
pub mod update;
pub mod batch;

pub use error::{Error, Result};
pub use types::*;
pub use query::{Paging, Query, QueryPage, QueryRequest};
pub use update::Updater;
pub use batch::{BatchResult, ItemList, MAX_BATCH_SIZE};
