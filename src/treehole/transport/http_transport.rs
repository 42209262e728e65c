//! reqwest-backed transport sending credentialed requests to the Treehole
//! API.

use async_trait::async_trait;
use http::header::{ACCEPT, AUTHORIZATION, COOKIE, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use url::Url;

use super::{ApiRequest, RequestTransport};
use crate::treehole::credentials::AmbientCredentials;
use crate::treehole::error::TreeholeError;

/// Production API base.
pub const DEFAULT_API_BASE: &str = "https://treehole.pku.edu.cn/api/";

const REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
const XSRF_TOKEN: HeaderName = HeaderName::from_static("x-xsrf-token");
const DEVICE_UUID: HeaderName = HeaderName::from_static("uuid");

/// Standard transport: a reqwest client plus the ambient credentials read
/// for every request.
///
/// No request timeout is configured; callers needing a deadline race the
/// returned future against their own timer.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
    credentials: AmbientCredentials,
}

impl HttpTransport {
    /// Creates a transport for `api_base` with a default reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidUrl`] when the base cannot be parsed
    /// and [`TreeholeError::Configuration`] when the HTTP client cannot be
    /// built.
    pub fn new(api_base: &str, credentials: AmbientCredentials) -> Result<Self, TreeholeError> {
        let client = Client::builder()
            .build()
            .map_err(|error| TreeholeError::Configuration {
                message: format!("failed to configure HTTP client: {error}"),
            })?;
        Self::with_client(client, api_base, credentials)
    }

    /// Creates a transport around an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidUrl`] when the base cannot be parsed.
    pub fn with_client(
        client: Client,
        api_base: &str,
        credentials: AmbientCredentials,
    ) -> Result<Self, TreeholeError> {
        Ok(Self {
            client,
            base: normalise_base(api_base)?,
            credentials,
        })
    }

    /// Returns the API base, always ending in `/`.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves the full URL for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidUrl`] when the path cannot be joined
    /// onto the base.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, TreeholeError> {
        let mut url = self
            .base
            .join(request.path().as_str())
            .map_err(|error| TreeholeError::InvalidUrl(format!("{}: {error}", request.path())))?;
        if !request.query().is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in request.query() {
                pairs.append_pair(name, &value.to_string());
            }
        }
        Ok(url)
    }
}

fn normalise_base(api_base: &str) -> Result<Url, TreeholeError> {
    let with_slash = if api_base.ends_with('/') {
        api_base.to_owned()
    } else {
        format!("{api_base}/")
    };
    Url::parse(&with_slash).map_err(|error| TreeholeError::InvalidUrl(format!("{api_base}: {error}")))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, TreeholeError> {
    HeaderValue::from_str(value).map_err(|_| TreeholeError::Configuration {
        message: format!("{name} contains characters that cannot be sent in an HTTP header"),
    })
}

/// Builds request headers from the current credentials.
///
/// Credential headers are only added for present, non-empty values.
///
/// # Errors
///
/// Returns [`TreeholeError::Configuration`] when a credential cannot be
/// encoded as a header value.
pub(crate) fn build_headers(credentials: &AmbientCredentials) -> Result<HeaderMap, TreeholeError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));

    if let Some(token) = credentials.session_token().filter(|token| !token.is_empty()) {
        headers.insert(
            AUTHORIZATION,
            header_value("session token", &format!("Bearer {token}"))?,
        );
    }
    if let Some(xsrf) = credentials.xsrf_token().filter(|xsrf| !xsrf.is_empty()) {
        headers.insert(XSRF_TOKEN, header_value("XSRF token", &xsrf)?);
    }
    if let Some(uuid) = credentials.device_uuid().filter(|uuid| !uuid.is_empty()) {
        headers.insert(DEVICE_UUID, header_value("device uuid", &uuid)?);
    }
    if let Some(cookies) = credentials.cookie_header() {
        headers.insert(COOKIE, header_value("cookies", &cookies)?);
    }

    Ok(headers)
}

#[async_trait]
impl RequestTransport for HttpTransport {
    async fn get(&self, request: &ApiRequest) -> Result<serde_json::Value, TreeholeError> {
        let url = self.url_for(request)?;
        let headers = build_headers(&self.credentials)?;
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|error| TreeholeError::Network {
                message: format!("{} request failed: {error}", request.path()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TreeholeError::HttpStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| TreeholeError::Network {
                message: format!("{} response body could not be read: {error}", request.path()),
            })?;

        serde_json::from_slice(&body).map_err(|error| TreeholeError::MalformedResponse {
            message: format!("{} response is not JSON: {error}", request.path()),
        })
    }
}
