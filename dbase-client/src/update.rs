//! Partial updates of a single item
use crate::base::Base;
use crate::error::Result;
use crate::transport::Method;
use dbase_core::Updater;
use serde_json::Value;

/// Send the updater to one key and return the decoded response as-is.
///
/// The response is not inspected: a missing key or a rejected operation
/// comes back as the server's JSON description.
pub(crate) async fn update(base: &Base, key: &str, updater: &Updater) -> Result<Value> {
    updater.validate()?;
    let url = base.item_url(key)?;
    let response = base.send(Method::Patch, &url, Some(updater.to_json())).await?;
    response.json()
}
