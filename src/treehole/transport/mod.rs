//! Request transports for the Treehole API.
//!
//! A transport performs one GET against a fixed API base and returns the
//! decoded JSON body. The trait is the seam that lets alternative transports
//! (or test doubles) stand in for [`HttpTransport`] without touching the
//! client.

mod http_transport;

pub use http_transport::{DEFAULT_API_BASE, HttpTransport};

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::TreeholeError;

/// Endpoint path relative to the API base.
///
/// Paths never start with `/`: joining such a path onto the base would drop
/// the base's own sub-path (`/api/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath(String);

impl ApiPath {
    /// Validates and wraps a relative path.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidPath`] when the path is empty or starts
    /// with `/`.
    pub fn new(path: impl Into<String>) -> Result<Self, TreeholeError> {
        let value = path.into();
        if value.is_empty() || value.starts_with('/') {
            return Err(TreeholeError::InvalidPath { path: value });
        }
        Ok(Self(value))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Query parameter value; only strings and numbers are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Text value.
    Text(String),
    /// Integer value.
    Number(i64),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => formatter.write_str(text),
            Self::Number(number) => write!(formatter, "{number}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

/// A GET request: a relative path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    path: ApiPath,
    query: Vec<(String, QueryValue)>,
}

impl ApiRequest {
    /// Creates a request without query parameters.
    #[must_use]
    pub const fn new(path: ApiPath) -> Self {
        Self {
            path,
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Returns the endpoint path.
    #[must_use]
    pub const fn path(&self) -> &ApiPath {
        &self.path
    }

    /// Returns the query parameters in insertion order.
    #[must_use]
    pub fn query(&self) -> &[(String, QueryValue)] {
        &self.query
    }

    /// Looks up a query parameter by name.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&QueryValue> {
        self.query
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }
}

/// Performs a single request against the Treehole API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestTransport: Send + Sync {
    /// Sends the request and returns the parsed JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::Network`] when the request cannot complete,
    /// [`TreeholeError::HttpStatus`] for non-success statuses, and
    /// [`TreeholeError::MalformedResponse`] when the body is not JSON.
    async fn get(&self, request: &ApiRequest) -> Result<serde_json::Value, TreeholeError>;
}

/// Sends `request` and decodes the body into `T`.
///
/// # Errors
///
/// Propagates transport failures and returns
/// [`TreeholeError::MalformedResponse`] when the body does not match `T`.
pub async fn get_json<T, Transport>(
    transport: &Transport,
    request: &ApiRequest,
) -> Result<T, TreeholeError>
where
    T: DeserializeOwned,
    Transport: RequestTransport + ?Sized,
{
    let body = transport.get(request).await?;
    serde_json::from_value(body).map_err(|error| TreeholeError::MalformedResponse {
        message: format!("{} response did not match: {error}", request.path()),
    })
}
