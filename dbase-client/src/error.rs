//! Error types for the Base client
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Server returned status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Scan stopped after {0} pages")]
    ScanLimitExceeded(usize),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns a stable error code for this error variant.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ClientError::AlreadyExists(_) => "ALREADY_EXISTS",
            ClientError::ConnectionError(_) => "CONNECTION_ERROR",
            ClientError::Timeout(_) => "TIMEOUT",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::ScanLimitExceeded(_) => "SCAN_LIMIT_EXCEEDED",
            ClientError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True for failures of the request itself rather than of its input.
    ///
    /// Transport failures are fatal for the call that hit them.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionError(_)
                | ClientError::Timeout(_)
                | ClientError::Transport(_)
                | ClientError::Decode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Convert reqwest errors to ClientError
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let msg = err.to_string();

        if err.is_timeout() {
            ClientError::Timeout(msg)
        } else if err.is_connect() {
            ClientError::ConnectionError(msg)
        } else if err.is_decode() {
            ClientError::Decode(msg)
        } else if err.is_builder() {
            ClientError::InvalidArgument(msg)
        } else {
            ClientError::Transport(msg)
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Local encoding failures are caller misuse
impl From<dbase_core::Error> for ClientError {
    fn from(err: dbase_core::Error) -> Self {
        match err {
            dbase_core::Error::Serialization(e) => ClientError::Decode(e.to_string()),
            other => ClientError::InvalidArgument(other.to_string()),
        }
    }
}
