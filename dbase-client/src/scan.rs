//! Full-collection scan following continuation tokens
use crate::base::Base;
use crate::error::{ClientError, Result};
use crate::transport::Method;
use dbase_core::{Item, QueryPage};
use serde_json::json;
use tracing::debug;

/// Walk every page of the Base sequentially.
///
/// The first request carries no body. Each following request sends the
/// previous page's `paging.last` token; the walk ends when a page has none.
/// Pages without items still continue the walk if they carry a token.
pub(crate) async fn scan_all(base: &Base) -> Result<Vec<Item>> {
    let url = base.query_url();
    let max_pages = base.config().max_scan_pages;

    let mut items = Vec::new();
    let mut last: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let body = last.take().map(|token| json!({ "last": token }));
        let page: QueryPage = base
            .send(Method::Post, &url, body)
            .await?
            .error_for_status()?
            .json()?;
        pages += 1;

        let next = page.continuation().map(str::to_string);
        debug!(base = %base, page = pages, items = page.items.len(), more = next.is_some(), "scanned page");
        items.extend(page.items);

        match next {
            None => return Ok(items),
            Some(_) if max_pages.is_some_and(|max| pages >= max) => {
                return Err(ClientError::ScanLimitExceeded(pages));
            }
            Some(token) => last = Some(token),
        }
    }
}
