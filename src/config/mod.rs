//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.treehole.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `TREEHOLE_PID`, `TREEHOLE_TOKEN`, or the
//!    fallback `PKU_TOKEN`
//! 4. **Command-line arguments** – `--pid`/`-p`, `--token`/`-t`, and friends
//!
//! # Configuration File
//!
//! ```toml
//! cookie_file = "~/.config/treehole/cookies.txt"
//! storage_file = "~/.config/treehole/storage.json"
//! page_size = 50
//! sort = "asc"
//! format = "json"
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;
use crate::treehole::credentials::{
    AmbientCredentials, CookieFile, CookieJar, CookieSource, CredentialSource, DEVICE_UUID_KEY,
    Layered, MemoryStore, SESSION_TOKEN_COOKIE, StorageFile, XSRF_TOKEN_COOKIE,
};
use crate::treehole::{CommentQuery, DEFAULT_API_BASE, PostId, SortOrder, TreeholeError};

/// Environment variable consulted when no token is configured.
pub const FALLBACK_TOKEN_VAR: &str = "PKU_TOKEN";

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Where the export is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    Stdout,
    /// A file at the given path.
    File(String),
    /// A generated file name in the current directory.
    Generated,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `TREEHOLE_PID` or `--pid`: Post to export
/// - `TREEHOLE_TOKEN`, `PKU_TOKEN`, or `--token`: Session token
/// - `TREEHOLE_COOKIE_FILE` or `--cookie-file`: Cookie file re-read per request
/// - `TREEHOLE_OUTPUT` or `--output`: Output path (`-` for stdout)
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use treehole_export::ExportConfig;
///
/// let config = ExportConfig::load().expect("failed to load configuration");
/// let pid = config.require_pid().expect("post id required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "TREEHOLE",
    discovery(
        dotfile_name = ".treehole.toml",
        config_file_name = "treehole.toml",
        app_name = "treehole"
    )
)]
pub struct ExportConfig {
    /// Post to export: `123`, `#123`, or a Treehole URL.
    ///
    /// Can be provided via:
    /// - CLI: `--pid <PID>` or `-p <PID>`
    /// - Environment: `TREEHOLE_PID`
    #[ortho_config(cli_short = 'p')]
    pub pid: Option<String>,

    /// API base URL; defaults to the production service.
    #[ortho_config()]
    pub base_url: Option<String>,

    /// Session token sent as a bearer credential.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `TREEHOLE_TOKEN` or `PKU_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Anti-forgery token sent as `X-XSRF-TOKEN`.
    #[ortho_config()]
    pub xsrf_token: Option<String>,

    /// Device identifier sent as `Uuid`.
    #[ortho_config()]
    pub uuid: Option<String>,

    /// File holding a browser cookie string, re-read for every request.
    #[ortho_config(cli_short = 'c')]
    pub cookie_file: Option<String>,

    /// JSON file standing in for the browser's persistent storage.
    #[ortho_config(cli_short = 'S')]
    pub storage_file: Option<String>,

    /// Comments requested per page.
    #[ortho_config()]
    pub page_size: u32,

    /// Comment ordering, `asc` or `desc`.
    #[ortho_config(cli_short = 's')]
    pub sort: Option<String>,

    /// Export format, `json` or `jsonl`.
    #[ortho_config(cli_short = 'f')]
    pub format: Option<String>,

    /// Output path; `-` writes to stdout. Defaults to a generated name.
    #[ortho_config(cli_short = 'o')]
    pub output: Option<String>,

    /// Abandons the export when it takes longer than this many seconds.
    #[ortho_config()]
    pub timeout_seconds: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pid: None,
            base_url: None,
            token: None,
            xsrf_token: None,
            uuid: None,
            cookie_file: None,
            storage_file: None,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            format: None,
            output: None,
            timeout_seconds: None,
        }
    }
}

impl ExportConfig {
    /// Returns the post id or an error if missing or invalid.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::Configuration`] when no post id is configured
    /// and [`TreeholeError::InvalidPostId`] when it cannot be parsed.
    pub fn require_pid(&self) -> Result<PostId, TreeholeError> {
        let raw = self
            .pid
            .as_deref()
            .ok_or_else(|| TreeholeError::Configuration {
                message: "post id is required (use --pid or -p)".to_owned(),
            })?;
        PostId::parse(raw)
    }

    /// Returns the configured API base or the production default.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Resolves the token from configuration or the `PKU_TOKEN` environment
    /// variable. Empty values count as absent.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        non_empty(self.token.as_deref())
            .or_else(|| non_empty(env::var(FALLBACK_TOKEN_VAR).ok().as_deref()))
    }

    /// Builds the comment query from `sort` and `page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::Configuration`] for an unknown sort order and
    /// [`TreeholeError::InvalidPagination`] for a zero page size.
    pub fn comment_query(&self) -> Result<CommentQuery, TreeholeError> {
        let sort = self
            .sort
            .as_deref()
            .map_or(Ok(SortOrder::default()), str::parse)?;
        if self.page_size == 0 {
            return Err(TreeholeError::InvalidPagination {
                message: "page_size must be positive".to_owned(),
            });
        }
        Ok(CommentQuery::new(sort, self.page_size))
    }

    /// Returns the export format, defaulting to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::Configuration`] for an unknown format.
    pub fn export_format(&self) -> Result<ExportFormat, TreeholeError> {
        self.format
            .as_deref()
            .map_or(Ok(ExportFormat::default()), str::parse)
    }

    /// Returns where the export should be written.
    #[must_use]
    pub fn output_target(&self) -> OutputTarget {
        match self.output.as_deref() {
            None | Some("") => OutputTarget::Generated,
            Some("-") => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(path.to_owned()),
        }
    }

    /// Returns the caller-side deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Builds the credential sources for the transport.
    ///
    /// Explicit `token`, `xsrf_token`, and `uuid` values take precedence over
    /// the cookie and storage files. Empty values count as absent.
    #[must_use]
    pub fn credentials(&self) -> AmbientCredentials {
        let explicit_cookies = [
            (SESSION_TOKEN_COOKIE, self.resolve_token()),
            (XSRF_TOKEN_COOKIE, non_empty(self.xsrf_token.as_deref())),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value.map(|present| format!("{name}={}", urlencoding::encode(&present)))
        })
        .collect::<Vec<_>>()
        .join("; ");

        let mut cookie_layers: Vec<Arc<dyn CookieSource>> =
            vec![Arc::new(CookieJar::new(explicit_cookies))];
        if let Some(path) = self.cookie_file.as_deref() {
            cookie_layers.push(Arc::new(CookieFile::new(path)));
        }

        let mut storage_layers: Vec<Arc<dyn CredentialSource>> = vec![Arc::new(
            MemoryStore::new().with_optional(DEVICE_UUID_KEY, non_empty(self.uuid.as_deref())),
        )];
        if let Some(path) = self.storage_file.as_deref() {
            storage_layers.push(Arc::new(StorageFile::new(path)));
        }

        AmbientCredentials::new(
            Arc::new(Layered::new(cookie_layers)),
            Arc::new(Layered::new(storage_layers)),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|present| !present.is_empty()).map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests;
