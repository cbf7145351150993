use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns a stable error code for this error variant.
    /// These codes are stable and can be used by callers for error classification.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::InvalidRecord(_) => "INVALID_RECORD",
            Error::InvalidQuery(_) => "INVALID_QUERY",
            Error::InvalidUpdate(_) => "INVALID_UPDATE",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
