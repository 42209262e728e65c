//! Ambient authentication material for Treehole requests.
//!
//! Credentials live in two browser-style stores: cookies (session token and
//! anti-forgery token) and persistent storage (device identifier). Both are
//! modelled as read-only key-value sources that are consulted afresh on every
//! request, so a login that changes mid-session is picked up by the next
//! page fetch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// Cookie holding the bearer session token.
pub const SESSION_TOKEN_COOKIE: &str = "pku_token";
/// Cookie holding the anti-forgery token.
pub const XSRF_TOKEN_COOKIE: &str = "XSRF-TOKEN";
/// Storage key holding the persistent device identifier.
pub const DEVICE_UUID_KEY: &str = "pku-uuid";

/// Read-only key-value provider.
pub trait CredentialSource: Send + Sync {
    /// Returns the value stored under `name`, or `None` when it is absent.
    fn read(&self, name: &str) -> Option<String>;
}

/// A credential source backed by cookies that can also be forwarded as-is.
pub trait CookieSource: CredentialSource {
    /// Returns the raw `Cookie` header value, or `None` when no cookies exist.
    fn cookie_header(&self) -> Option<String>;
}

/// Looks up `name` in a `document.cookie`-style string and percent-decodes
/// the value.
fn find_cookie(raw: &str, name: &str) -> Option<String> {
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key != name {
            return None;
        }
        let decoded = urlencoding::decode(value).map_or_else(
            |_| value.to_owned(),
            std::borrow::Cow::into_owned,
        );
        Some(decoded)
    })
}

fn normalise_cookie_header(raw: &str) -> Option<String> {
    let joined = raw
        .split(';')
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect::<Vec<_>>()
        .join("; ");
    if joined.is_empty() { None } else { Some(joined) }
}

/// Cookies held in memory, parsed from a `name=value; name2=value2` string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    raw: String,
}

impl CookieJar {
    /// Creates a jar from a cookie string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

impl CredentialSource for CookieJar {
    fn read(&self, name: &str) -> Option<String> {
        find_cookie(&self.raw, name)
    }
}

impl CookieSource for CookieJar {
    fn cookie_header(&self) -> Option<String> {
        normalise_cookie_header(&self.raw)
    }
}

/// Reads a UTF-8 file through a capability-scoped directory handle.
///
/// Missing or unreadable files are reported as `None`.
fn read_file(path: &Utf8Path) -> Option<String> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name()?;

    let contents = Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read_to_string(file_name));
    match contents {
        Ok(text) => Some(text),
        Err(error) => {
            tracing::debug!("credential file '{path}' is unreadable: {error}");
            None
        }
    }
}

/// Cookies stored in a file, re-read on every lookup.
///
/// The file holds a single cookie string, as copied from a browser's
/// `document.cookie` or a `Cookie` request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieFile {
    path: Utf8PathBuf,
}

impl CookieFile {
    /// Creates a source for the cookie file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for CookieFile {
    fn read(&self, name: &str) -> Option<String> {
        read_file(&self.path).and_then(|raw| find_cookie(raw.trim(), name))
    }
}

impl CookieSource for CookieFile {
    fn cookie_header(&self) -> Option<String> {
        read_file(&self.path).and_then(|raw| normalise_cookie_header(raw.trim()))
    }
}

/// In-memory key-value store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, replacing any previous value for `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Adds a value when one is given.
    #[must_use]
    pub fn with_optional(self, name: impl Into<String>, value: Option<String>) -> Self {
        match value {
            Some(present) => self.with(name, present),
            None => self,
        }
    }
}

impl CredentialSource for MemoryStore {
    fn read(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Persistent storage kept in a JSON object file, re-read on every lookup.
///
/// Non-string values are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFile {
    path: Utf8PathBuf,
}

impl StorageFile {
    /// Creates a source for the JSON storage file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for StorageFile {
    fn read(&self, name: &str) -> Option<String> {
        let raw = read_file(&self.path)?;
        let value = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("storage file '{}' is not valid JSON: {error}", self.path);
                return None;
            }
        };
        value
            .get(name)
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned)
    }
}

/// Stacked sources consulted in order; earlier layers win.
///
/// Works over plain stores (`Layered<dyn CredentialSource>`) and over cookie
/// stores (`Layered<dyn CookieSource>`), where the forwarded cookie header
/// joins every layer's cookies.
pub struct Layered<S: ?Sized> {
    layers: Vec<Arc<S>>,
}

impl<S: ?Sized> Layered<S> {
    /// Creates a layered source.
    #[must_use]
    pub const fn new(layers: Vec<Arc<S>>) -> Self {
        Self { layers }
    }
}

impl CredentialSource for Layered<dyn CredentialSource> {
    fn read(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.read(name))
    }
}

impl CredentialSource for Layered<dyn CookieSource> {
    fn read(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.read(name))
    }
}

impl CookieSource for Layered<dyn CookieSource> {
    /// Joins every layer's cookies; a name set by an earlier layer shadows the
    /// same name in later layers.
    fn cookie_header(&self) -> Option<String> {
        let headers: Vec<String> = self
            .layers
            .iter()
            .filter_map(|layer| layer.cookie_header())
            .collect();
        let mut seen = HashSet::new();
        let joined = headers
            .iter()
            .flat_map(|header| header.split("; "))
            .filter(|pair| {
                let name = pair.split_once('=').map_or(*pair, |(key, _)| key);
                seen.insert(name)
            })
            .collect::<Vec<_>>()
            .join("; ");
        if joined.is_empty() { None } else { Some(joined) }
    }
}

/// The cookie store and persistent store consulted for each request.
#[derive(Clone)]
pub struct AmbientCredentials {
    cookies: Arc<dyn CookieSource>,
    storage: Arc<dyn CredentialSource>,
}

impl AmbientCredentials {
    /// Bundles a cookie store and a persistent store.
    #[must_use]
    pub fn new(cookies: Arc<dyn CookieSource>, storage: Arc<dyn CredentialSource>) -> Self {
        Self { cookies, storage }
    }

    /// Credentials with no cookies and no stored values.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(Arc::new(CookieJar::default()), Arc::new(MemoryStore::new()))
    }

    /// Session token from the `pku_token` cookie.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.cookies.read(SESSION_TOKEN_COOKIE)
    }

    /// Anti-forgery token from the `XSRF-TOKEN` cookie.
    #[must_use]
    pub fn xsrf_token(&self) -> Option<String> {
        self.cookies.read(XSRF_TOKEN_COOKIE)
    }

    /// Device identifier from the `pku-uuid` storage entry.
    #[must_use]
    pub fn device_uuid(&self) -> Option<String> {
        self.storage.read(DEVICE_UUID_KEY)
    }

    /// Cookies forwarded with credentialed requests.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.cookies.cookie_header()
    }
}

impl Default for AmbientCredentials {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl std::fmt::Debug for AmbientCredentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AmbientCredentials")
            .finish_non_exhaustive()
    }
}
