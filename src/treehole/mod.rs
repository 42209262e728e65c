//! PKU Treehole API client.
//!
//! This module reads ambient credentials, sends credentialed requests to the
//! Treehole API, and drives the comment pagination protocol that turns an
//! unknown number of pages into one ordered thread. Every endpoint answers
//! with a [`ResponseEnvelope`]; failures are surfaced as [`TreeholeError`]
//! variants and never replaced by default values.

pub mod client;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod intake;
pub mod models;
pub mod transport;

pub use client::{CommentQuery, DEFAULT_PAGE_SIZE, TreeholeClient};
pub use credentials::{
    AmbientCredentials, CookieFile, CookieJar, CookieSource, CredentialSource, Layered,
    MemoryStore, StorageFile,
};
pub use envelope::ResponseEnvelope;
pub use error::TreeholeError;
pub use intake::ThreadIntake;
pub use models::{Aggregate, Comment, POST_AUTHOR_SENTINEL, Page, Post, PostId, Quote, SortOrder};
pub use transport::{ApiPath, ApiRequest, DEFAULT_API_BASE, HttpTransport, QueryValue, RequestTransport};
