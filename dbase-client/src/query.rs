//! Single-page filtered queries
use crate::base::Base;
use crate::error::Result;
use crate::transport::Method;
use dbase_core::{QueryPage, QueryRequest};

pub(crate) async fn query(base: &Base, request: &QueryRequest) -> Result<QueryPage> {
    request.validate()?;
    let body = serde_json::to_value(request)?;
    base.send(Method::Post, &base.query_url(), Some(body))
        .await?
        .error_for_status()?
        .json()
}
