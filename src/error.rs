//! Error types for musicgpt-nodes
//!
//! Errors fall into two classes:
//! - Validation errors raised locally before any request is sent (missing or
//!   out-of-range parameters, unknown operations, bad credentials)
//! - Transport and API errors wrapping the failed request's method and path
//!
//! Neither class is retried. Hosts that continue on failure turn an error
//! into a per-item record via [`Error::to_record`].

use crate::types::Record;
use serde_json::Value;
use thiserror::Error;

/// Result type alias for musicgpt-nodes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for musicgpt-nodes
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_key")
        key: Option<String>,
    },

    /// A parameter value failed validation
    #[error("invalid value for '{field}': {message}")]
    Validation {
        /// Name of the offending parameter
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// A required parameter was not supplied
    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    /// The named binary property has no data attached
    #[error("no binary data found in property '{0}'")]
    MissingBinary(String),

    /// The resource/operation pair is not part of the catalogue
    #[error("unknown operation '{operation}' for resource '{resource}'")]
    UnknownOperation {
        /// Resource selector value
        resource: String,
        /// Operation selector value
        operation: String,
    },

    /// The request could not be sent or its body could not be read
    #[error("{method} {path} failed: {source}")]
    Request {
        /// HTTP method of the failed request
        method: String,
        /// API path of the failed request
        path: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success HTTP status
    #[error("{method} {path} returned HTTP {status}: {message}")]
    Api {
        /// HTTP method of the failed request
        method: String,
        /// API path of the failed request
        path: String,
        /// HTTP status code
        status: u16,
        /// Error text reported by the API (or the raw body)
        message: String,
    },

    /// The API answered 2xx but the body is not a JSON object
    #[error("{method} {path} returned an unexpected response: {reason}")]
    UnexpectedResponse {
        /// HTTP method of the request
        method: String,
        /// API path of the request
        path: String,
        /// Why the body was rejected
        reason: String,
    },

    /// The API answered with `success: false`
    #[error("{path} was rejected: {message}")]
    Rejected {
        /// API path of the request
        path: String,
        /// Message reported by the API
        message: String,
    },

    /// An input item failed while continue-on-failure was off
    #[error("item {index} failed: {source}")]
    ItemFailed {
        /// Zero-based index of the input item
        index: usize,
        /// The error raised for that item
        #[source]
        source: Box<Error>,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised before any request was sent
    pub fn is_validation(&self) -> bool {
        match self {
            Error::Config { .. }
            | Error::Validation { .. }
            | Error::MissingParameter(_)
            | Error::MissingBinary(_)
            | Error::UnknownOperation { .. } => true,
            Error::ItemFailed { source, .. } => source.is_validation(),
            _ => false,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation { .. } => "validation_error",
            Error::MissingParameter(_) => "missing_parameter",
            Error::MissingBinary(_) => "missing_binary",
            Error::UnknownOperation { .. } => "unknown_operation",
            Error::Request { source, .. } if source.is_timeout() => "timeout",
            Error::Request { .. } => "network_error",
            Error::Api { .. } => "api_error",
            Error::UnexpectedResponse { .. } => "unexpected_response",
            Error::Rejected { .. } => "rejected",
            Error::ItemFailed { source, .. } => source.error_code(),
            Error::Serialization(_) => "serialization_error",
            Error::Other(_) => "internal_error",
        }
    }

    /// Error entry emitted in place of an item's output when the host
    /// continues on failure
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("error".to_string(), Value::String(self.to_string()));
        record.insert(
            "code".to_string(),
            Value::String(self.error_code().to_string()),
        );
        record
    }
}
