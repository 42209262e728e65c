//! Error types exposed by the Treehole client layer.

use thiserror::Error;

/// Errors surfaced while talking to the Treehole service or preparing an
/// export.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeholeError {
    /// The request could not complete at the transport level.
    #[error("network error talking to Treehole: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} {status_text}")]
    HttpStatus {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase for the status, empty when unknown.
        status_text: String,
    },

    /// The service returned a well-formed envelope flagged as unsuccessful.
    #[error("{message}")]
    ApiFailure {
        /// Application-level code carried by the envelope.
        code: i64,
        /// Server message, displayed to the user verbatim.
        message: String,
    },

    /// The response body was not JSON or did not match the expected shape.
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// Decoder detail.
        message: String,
    },

    /// An endpoint path started with `/` and would discard the base sub-path.
    #[error("request path must be relative to the API base: {path}")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },

    /// The post identifier could not be parsed.
    #[error("post id must be a positive integer, got '{input}'")]
    InvalidPostId {
        /// Raw user input.
        input: String,
    },

    /// Invalid pagination parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// The API base URL could not be parsed.
    #[error("API base URL is invalid: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// The caller-side deadline elapsed before the export finished.
    #[error("export did not finish within {seconds} seconds")]
    Timeout {
        /// The configured deadline.
        seconds: u64,
    },
}
