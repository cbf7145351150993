//! Create-only writes, one request per record
use crate::base::Base;
use crate::error::{ClientError, Result};
use crate::fanout;
use crate::transport::Method;
use dbase_core::Record;
use serde_json::{json, Value};

const STATUS_CONFLICT: u16 = 409;

pub(crate) async fn insert(base: &Base, records: &[Record]) -> Result<Option<Vec<Value>>> {
    if records.is_empty() {
        return Ok(None);
    }

    let url = base.items_url();
    let responses = fanout::try_join_ordered(
        records.iter().map(|record| insert_one(base, &url, record)),
        base.fanout_limit(),
    )
    .await?;

    Ok(Some(responses))
}

async fn insert_one(base: &Base, url: &str, record: &Record) -> Result<Value> {
    let body = json!({ "item": record.to_json() });
    let response = base.send(Method::Post, url, Some(body)).await?;

    if response.status() == STATUS_CONFLICT {
        return Err(ClientError::AlreadyExists(format!(
            "item with key '{}' already exists",
            record.key().unwrap_or_default()
        )));
    }

    // Other statuses pass through; the body describes the outcome
    response.json()
}
