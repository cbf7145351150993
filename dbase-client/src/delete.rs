//! Fan-out deletes
use crate::base::Base;
use crate::error::{ClientError, Result};
use crate::fanout;
use crate::transport::Method;
use tracing::debug;

/// Delete every key, discarding the per-item responses.
///
/// All keys are validated before any request is sent. A transport failure
/// on any key fails the call.
pub(crate) async fn delete<K: AsRef<str>>(base: &Base, keys: &[K]) -> Result<()> {
    if keys.is_empty() {
        return Err(ClientError::InvalidArgument("no keys to delete".to_string()));
    }

    let urls = keys
        .iter()
        .map(|key| base.item_url(key.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    if let [url] = urls.as_slice() {
        base.send(Method::Delete, url, None).await?;
        return Ok(());
    }

    debug!(base = %base, keys = urls.len(), "deleting keys concurrently");
    fanout::try_join_ordered(
        urls.iter().map(|url| base.send(Method::Delete, url, None)),
        base.fanout_limit(),
    )
    .await?;

    Ok(())
}
