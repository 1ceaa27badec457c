use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Database request failed to complete: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Request throttled by the database (retry after {retry_after_ms:?} ms)")]
    Throttled { retry_after_ms: Option<u64> },

    #[error("Database rejected the request credentials ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Database request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Counter cannot be incremented past {value}")]
    Overflow { value: u64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connectivity problems and throttling.
    Transient,
    NotFound,
    Auth,
    /// Any other non-success answer from the database.
    Remote,
    /// A response or document that could not be decoded.
    Malformed,
    Logic,
    Configuration,
}

impl CounterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CounterError::Transport(e) if e.is_decode() => ErrorCategory::Malformed,
            CounterError::Transport(_) | CounterError::Throttled { .. } => {
                ErrorCategory::Transient
            }
            CounterError::NotFound { .. } => ErrorCategory::NotFound,
            CounterError::Unauthorized { .. } => ErrorCategory::Auth,
            CounterError::Http { .. } => ErrorCategory::Remote,
            CounterError::SerializationError(_) => ErrorCategory::Malformed,
            CounterError::Overflow { .. } => ErrorCategory::Logic,
            CounterError::ConfigError { .. }
            | CounterError::MissingConfigError { .. }
            | CounterError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            CounterError::Http { status, .. } => *status >= 500,
            other => other.category() == ErrorCategory::Transient,
        }
    }
}

pub type Result<T> = std::result::Result<T, CounterError>;
