//! Batched writes
use crate::base::Base;
use crate::error::Result;
use crate::fanout;
use crate::transport::Method;
use dbase_core::{batch::chunk, BatchResult, Record};
use serde::Serialize;
use tracing::debug;

/// Body of one write request
#[derive(Serialize)]
struct WriteBody<'a> {
    items: &'a [Record],
}

/// Write records in server-sized chunks and merge the reports.
///
/// A single chunk is written with one request. Several chunks are written
/// concurrently; their reports are folded in chunk order so the merged
/// result does not depend on network timing. A failed chunk request fails
/// the whole call.
pub(crate) async fn put(base: &Base, records: &[Record]) -> Result<BatchResult> {
    if records.is_empty() {
        debug!(base = %base, "put called without records, nothing to write");
        return Ok(BatchResult::new());
    }

    let chunks = chunk(records, base.config().batch_size)?;
    if let [only] = chunks.as_slice() {
        return write_chunk(base, only).await;
    }

    debug!(base = %base, records = records.len(), chunks = chunks.len(), "splitting batch write");
    let reports = fanout::try_join_ordered(
        chunks.into_iter().map(|records| write_chunk(base, records)),
        base.fanout_limit(),
    )
    .await?;

    let merged: BatchResult = reports.into_iter().collect();
    debug!(
        base = %base,
        processed = merged.processed().len(),
        failed = merged.failed().len(),
        "merged batch write reports"
    );
    Ok(merged)
}

async fn write_chunk(base: &Base, records: &[Record]) -> Result<BatchResult> {
    let body = serde_json::to_value(WriteBody { items: records })?;
    let response = base
        .send(Method::Put, &base.items_url(), Some(body))
        .await?
        .error_for_status()?;
    response.json()
}
