//! Handle to one Base collection and its public operations
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::fetch::KeyedFetch;
use crate::transport::{Headers, Method, Response, Transport};
use dbase_core::{BatchResult, Item, QueryPage, QueryRequest, Record, Updater};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A Base (collection) bound to a project and a shared transport.
///
/// Cloning is cheap; clones share the transport and configuration.
/// Operations hold no state between calls.
#[derive(Clone)]
pub struct Base {
    name: String,
    root: String,
    headers: Arc<Headers>,
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Base {
    pub(crate) fn new(
        name: String,
        root: String,
        headers: Arc<Headers>,
        transport: Arc<dyn Transport>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            name,
            root,
            headers,
            transport,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root URL of this Base (`{host}/v1/{project_id}/{name}`)
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn items_url(&self) -> String {
        format!("{}/items", self.root)
    }

    /// URL of a single item; the key is encoded as one path segment
    pub(crate) fn item_url(&self, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(ClientError::InvalidArgument("key must not be empty".to_string()));
        }
        Ok(format!("{}/items/{}", self.root, urlencoding::encode(key)))
    }

    pub(crate) fn query_url(&self) -> String {
        format!("{}/query", self.root)
    }

    pub(crate) fn fanout_limit(&self) -> Option<usize> {
        self.config.max_in_flight
    }

    /// Send one request with this Base's headers.
    ///
    /// GET and DELETE carry no body; callers pass `None` for them.
    pub(crate) async fn send(&self, method: Method, url: &str, body: Option<Value>) -> Result<Response> {
        debug!(base = %self.name, %method, url, "dispatching request");
        let headers = &self.headers;
        let response = match method {
            Method::Get => self.transport.get(url, headers).await?,
            Method::Put => self.transport.put(url, headers, body).await?,
            Method::Post => self.transport.post(url, headers, body).await?,
            Method::Patch => self.transport.patch(url, headers, body).await?,
            Method::Delete => self.transport.delete(url, headers).await?,
        };
        debug!(base = %self.name, %method, url, status = response.status(), "request completed");
        Ok(response)
    }

    /// Write records, replacing any existing items with the same keys.
    ///
    /// Records are sent in chunks of at most 25; chunks are written
    /// concurrently and their reports merged in chunk order. Items the
    /// server rejects are reported in [`BatchResult::failed`], not as errors.
    ///
    /// # Example
    /// ```no_run
    /// # use dbase_client::{Deta, Record};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let deta = Deta::new("a0abcyxz_secret")?;
    /// let users = deta.base("users")?;
    ///
    /// let result = users
    ///     .put(&[Record::new().with_key("alice").field("age", 30)])
    ///     .await?;
    /// println!("{} written, {} failed", result.processed().len(), result.failed().len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn put(&self, records: &[Record]) -> Result<BatchResult> {
        crate::batch::put(self, records).await
    }

    /// Create records that must not exist yet.
    ///
    /// Returns `None` for an empty input without contacting the server.
    /// Otherwise returns one decoded response per record, in input order.
    /// Fails with [`ClientError::AlreadyExists`] if a key is taken.
    pub async fn insert(&self, records: &[Record]) -> Result<Option<Vec<Value>>> {
        crate::insert::insert(self, records).await
    }

    /// Fetch items by key.
    ///
    /// - no keys: scans the whole Base (logs a warning, may be slow) and
    ///   returns every item, possibly an empty list
    /// - one or more keys: returns the items found, or `None` if none was
    ///
    /// Use [`Base::get_many`] to learn which keys were missing.
    ///
    /// # Example
    /// ```no_run
    /// # use dbase_client::Deta;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let deta = Deta::new("a0abcyxz_secret")?;
    /// let users = deta.base("users")?;
    ///
    /// match users.get(&["alice", "bob"]).await? {
    ///     Some(items) => println!("found {} users", items.len()),
    ///     None => println!("nobody home"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<K: AsRef<str>>(&self, keys: &[K]) -> Result<Option<Vec<Item>>> {
        crate::fetch::get(self, keys).await
    }

    /// Fetch items by key, reporting the outcome for every key
    pub async fn get_many<K: AsRef<str>>(&self, keys: &[K]) -> Result<KeyedFetch> {
        crate::fetch::get_many(self, keys).await
    }

    /// Walk every page of the Base and return all items
    pub async fn scan_all(&self) -> Result<Vec<Item>> {
        crate::scan::scan_all(self).await
    }

    /// Delete items by key. Missing keys are not an error.
    ///
    /// Fails with [`ClientError::InvalidArgument`] when called without keys.
    pub async fn delete<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        crate::delete::delete(self, keys).await
    }

    /// Apply a partial update to one item and return the server's response.
    ///
    /// The response body is returned as-is, whatever its status. The updater
    /// is validated first: an empty updater, a non-numeric increment, an
    /// update of `key` or a field named twice fails with
    /// [`ClientError::InvalidArgument`] without sending a request.
    ///
    /// # Example
    /// ```no_run
    /// # use dbase_client::{Deta, Updater};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let deta = Deta::new("a0abcyxz_secret")?;
    /// let users = deta.base("users")?;
    ///
    /// let updater = Updater::new().increment("age", 1).append("tags", "admin");
    /// let response = users.update("alice", &updater).await?;
    /// println!("{}", response);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update(&self, key: &str, updater: &Updater) -> Result<Value> {
        crate::update::update(self, key, updater).await
    }

    /// Run one filtered query and return a single page
    ///
    /// # Example
    /// ```no_run
    /// # use dbase_client::{Deta, Query, QueryRequest};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let deta = Deta::new("a0abcyxz_secret")?;
    /// let users = deta.base("users")?;
    ///
    /// let request = QueryRequest::new(vec![Query::new().greater_than("age", 18)]).limit(50);
    /// let page = users.query(&request).await?;
    /// println!("{} adults, more: {}", page.items.len(), page.continuation().is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryPage> {
        crate::query::query(self, request).await
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
