//! Top-level client holding the project credential
use crate::base::Base;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::transport::{Headers, ReqwestTransport, Transport, API_KEY_HEADER};
use std::fmt;
use std::sync::Arc;

/// Environment variable read by [`Deta::from_env`]
pub const PROJECT_KEY_ENV: &str = "DETA_PROJECT_KEY";

/// Deta project client.
///
/// Owns the shared transport (one connection pool) and builds [`Base`]
/// handles that reuse it.
#[derive(Clone)]
pub struct Deta {
    project_key: String,
    project_id: String,
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Deta {
    /// Create a client with the default configuration and HTTP transport
    ///
    /// # Example
    /// ```no_run
    /// # use dbase_client::Deta;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let deta = Deta::new("a0abcyxz_aSecretValue")?;
    /// assert_eq!(deta.project_id(), "a0abcyxz");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(project_key: impl Into<String>) -> Result<Self> {
        Self::with_config(project_key, ClientConfig::default())
    }

    /// Create a client from `DETA_PROJECT_KEY` and the `DETA_*` configuration variables
    pub fn from_env() -> Result<Self> {
        let project_key = std::env::var(PROJECT_KEY_ENV)
            .map_err(|_| ClientError::Config(format!("{} is not set", PROJECT_KEY_ENV)))?;
        Self::with_config(project_key, ClientConfig::from_env()?)
    }

    /// Create a client with a custom configuration and the HTTP transport
    pub fn with_config(project_key: impl Into<String>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(&config)?;
        Self::with_transport(project_key, config, Arc::new(transport))
    }

    /// Create a client over a caller-built `reqwest::Client`.
    ///
    /// The client's own timeout and pool settings apply;
    /// `config.request_timeout` is not consulted.
    pub fn with_http_client(
        project_key: impl Into<String>,
        config: ClientConfig,
        http: reqwest::Client,
    ) -> Result<Self> {
        let transport = ReqwestTransport::from_client(http);
        Self::with_transport(project_key, config, Arc::new(transport))
    }

    /// Create a client over any transport
    pub fn with_transport(
        project_key: impl Into<String>,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;

        let project_key = project_key.into();
        if project_key.trim().is_empty() {
            return Err(ClientError::Config("project key is required".to_string()));
        }
        let project_id = project_key
            .split('_')
            .next()
            .unwrap_or_default()
            .to_string();
        if project_id.is_empty() {
            return Err(ClientError::Config("project key has no project id prefix".to_string()));
        }

        Ok(Self {
            project_key,
            project_id,
            transport,
            config: Arc::new(config),
        })
    }

    /// Project id (the project key's prefix before the first `_`)
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a handle to a Base; no request is made
    pub fn base(&self, name: impl Into<String>) -> Result<Base> {
        let name = name.into();
        if name.is_empty() {
            return Err(ClientError::InvalidArgument("base name must not be empty".to_string()));
        }

        let root = format!(
            "{}/v1/{}/{}",
            self.config.database_host,
            self.project_id,
            urlencoding::encode(&name)
        );

        Ok(Base::new(
            name,
            root,
            Arc::new(self.auth_headers()),
            self.transport.clone(),
            self.config.clone(),
        ))
    }

    /// Headers carried by every request: the project key and a JSON content type
    fn auth_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert(API_KEY_HEADER.to_string(), self.project_key.clone());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }
}

impl fmt::Debug for Deta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deta")
            .field("project_id", &self.project_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
