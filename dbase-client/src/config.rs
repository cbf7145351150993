//! Client configuration for endpoints, timeouts and fan-out limits
use crate::error::{ClientError, Result};
use dbase_core::MAX_BATCH_SIZE;
use std::time::Duration;

/// Default host serving the Base HTTP API
pub const DEFAULT_DATABASE_HOST: &str = "https://database.deta.sh";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host of the Base API, without a trailing slash
    pub database_host: String,

    /// Per-request timeout applied by the HTTP transport (None = no timeout)
    pub request_timeout: Option<Duration>,

    /// Maximum sub-requests in flight for one fan-out call
    /// (None = every request of a phase is started at once)
    pub max_in_flight: Option<usize>,

    /// Maximum pages walked by a full scan (None = unbounded)
    pub max_scan_pages: Option<usize>,

    /// Records per write request (1-25)
    pub batch_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_host: DEFAULT_DATABASE_HOST.to_string(),
            request_timeout: None,
            max_in_flight: None,
            max_scan_pages: None,
            batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from defaults overridden by environment variables:
    /// `DETA_DATABASE_HOST`, `DETA_REQUEST_TIMEOUT_SECS` and `DETA_MAX_IN_FLIGHT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("DETA_DATABASE_HOST") {
            config = config.with_database_host(host);
        }
        if let Some(secs) = lookup("DETA_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                ClientError::Config(format!("DETA_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(limit) = lookup("DETA_MAX_IN_FLIGHT") {
            let limit: usize = limit.parse().map_err(|_| {
                ClientError::Config(format!("DETA_MAX_IN_FLIGHT is not a number: {}", limit))
            })?;
            config = config.with_max_in_flight(limit);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the API host (e.g. a local test server)
    pub fn with_database_host(mut self, host: impl Into<String>) -> Self {
        self.database_host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Cap concurrent sub-requests per call
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }

    /// Cap the number of pages a full scan may walk
    pub fn with_max_scan_pages(mut self, pages: usize) -> Self {
        self.max_scan_pages = Some(pages);
        self
    }

    /// Set the number of records per write request
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database_host.is_empty() {
            return Err(ClientError::Config("database_host must not be empty".to_string()));
        }

        if !self.database_host.starts_with("http://") && !self.database_host.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "database_host must start with http:// or https://, got {}",
                self.database_host
            )));
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ClientError::Config(format!(
                "batch_size must be between 1 and {}",
                MAX_BATCH_SIZE
            )));
        }

        if self.max_in_flight == Some(0) {
            return Err(ClientError::Config("max_in_flight must be greater than 0 when set".to_string()));
        }

        if self.max_scan_pages == Some(0) {
            return Err(ClientError::Config("max_scan_pages must be greater than 0 when set".to_string()));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ClientError::Config("request_timeout must be greater than 0 when set".to_string()));
        }

        Ok(())
    }
}
