//! HTTP transport abstraction
//!
//! Base operations talk to the server through [`Transport`], which performs
//! one HTTP call and hands back the status and raw body. [`ReqwestTransport`]
//! is the production implementation; tests plug in in-memory fakes.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Status codes treated as "item present / operation accepted"
pub const SUCCESS_FAMILY: [u16; 4] = [200, 201, 202, 207];

/// Header name carrying the project key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Header mapping attached to every request
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP call
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>, headers: &Headers, body: Option<Value>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: headers.clone(),
            body,
        }
    }
}

/// Status and raw body of a completed call
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Build a response with a JSON body
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// True when the status is in the success family
    pub fn is_success(&self) -> bool {
        SUCCESS_FAMILY.contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ClientError::Decode(format!("status {}: {}", self.status, e))
        })
    }

    /// Fail with the server's message unless the status is in the success family
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let message = String::from_utf8_lossy(&self.body).into_owned();
        Err(ClientError::Server {
            status: self.status,
            message,
        })
    }
}

/// Performs HTTP calls on behalf of Base operations.
///
/// Implementations must be shareable across concurrent calls; the client
/// never mutates transport state.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request
    async fn execute(&self, request: Request) -> Result<Response>;

    async fn get(&self, url: &str, headers: &Headers) -> Result<Response> {
        self.execute(Request::new(Method::Get, url, headers, None)).await
    }

    async fn put(&self, url: &str, headers: &Headers, body: Option<Value>) -> Result<Response> {
        self.execute(Request::new(Method::Put, url, headers, body)).await
    }

    async fn post(&self, url: &str, headers: &Headers, body: Option<Value>) -> Result<Response> {
        self.execute(Request::new(Method::Post, url, headers, body)).await
    }

    async fn patch(&self, url: &str, headers: &Headers, body: Option<Value>) -> Result<Response> {
        self.execute(Request::new(Method::Patch, url, headers, body)).await
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response> {
        self.execute(Request::new(Method::Delete, url, headers, None)).await
    }
}

/// Transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport honoring the config's request timeout
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shares its connection pool)
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::trace!(method = %request.method, url = %request.url, status, bytes = body.len(), "http call finished");
        Ok(Response::new(status, body))
    }
}
