//! Data models for posts, comments, and comment pages.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::TreeholeError;

/// Participant name standing in for the post's author.
pub const POST_AUTHOR_SENTINEL: &str = "洞主";

/// Positive post identifier ("pid").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(NonZeroU64);

impl PostId {
    /// Creates a post id, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidPostId`] when `value` is zero.
    pub fn new(value: u64) -> Result<Self, TreeholeError> {
        NonZeroU64::new(value)
            .map(Self)
            .ok_or_else(|| TreeholeError::InvalidPostId {
                input: value.to_string(),
            })
    }

    /// Parses a post id from `123`, `#123`, or a forum URL.
    ///
    /// URLs are accepted when their fragment or last path segment carries
    /// the number, e.g. `https://treehole.pku.edu.cn/web/#/hole/123`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidPostId`] when no positive integer can
    /// be extracted.
    pub fn parse(input: &str) -> Result<Self, TreeholeError> {
        let trimmed = input.trim();
        let invalid = || TreeholeError::InvalidPostId {
            input: input.to_owned(),
        };

        let candidate = if trimmed.contains("://") {
            let url = Url::parse(trimmed).map_err(|_| invalid())?;
            let tail = url
                .fragment()
                .filter(|fragment| !fragment.is_empty())
                .unwrap_or_else(|| url.path());
            tail.trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_owned()
        } else {
            trimmed.trim_start_matches('#').to_owned()
        };

        let value = candidate.parse::<u64>().map_err(|_| invalid())?;
        NonZeroU64::new(value).map(Self).ok_or_else(invalid)
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Ordering direction for comment pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    /// Returns the query parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = TreeholeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(TreeholeError::Configuration {
                message: format!("sort must be 'asc' or 'desc', got '{other}'"),
            }),
        }
    }
}

/// A Treehole post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post identifier.
    pub pid: u64,
    /// Body text.
    pub text: String,
    /// Content kind; `"text"` for ordinary posts.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Number of replies.
    pub reply: u64,
    /// Number of likes (follows).
    pub likenum: u64,
    /// Non-zero when the post was made anonymously.
    pub anonymous: u8,
    /// Attachment or canonical URL; empty when absent.
    #[serde(default)]
    pub url: String,
}

/// A comment quoted by another comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Post the quoted comment belongs to.
    pub pid: u64,
    /// Quoted text.
    pub text: String,
    /// Display name of the quoted author.
    pub name_tag: String,
}

/// A single comment in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub cid: u64,
    /// Parent post identifier.
    pub pid: u64,
    /// Body text.
    pub text: String,
    /// Secondary ordinal within the thread.
    pub comment_id: u64,
    /// Author display name (e.g. `Alice`).
    pub name: String,
    /// Comment being replied to, if any.
    pub quote: Option<Quote>,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

/// One page of a paginated listing.
///
/// `last_page` is the authoritative upper bound for pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Current page number (1-based).
    pub current_page: u32,
    /// Rows on this page, in server order.
    pub data: Vec<T>,
    /// Index of the first row, absent on empty pages.
    pub from: Option<u64>,
    /// Index of the last row, absent on empty pages.
    pub to: Option<u64>,
    /// Total number of rows across all pages.
    pub total: u64,
    /// Number of the last page.
    pub last_page: u32,
}

/// A post together with its complete thread, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// The post.
    pub post: Post,
    /// Every comment, in fetch order.
    pub comments: Vec<Comment>,
    /// Participant names in first-appearance order, author sentinel first.
    pub users: Vec<String>,
}

impl Aggregate {
    /// Builds the aggregate and its participant list.
    #[must_use]
    pub fn assemble(post: Post, comments: Vec<Comment>) -> Self {
        let users = participants(&comments);
        Self {
            post,
            comments,
            users,
        }
    }
}

/// Deduplicated participant names, starting with [`POST_AUTHOR_SENTINEL`].
///
/// Empty names are skipped.
#[must_use]
pub fn participants(comments: &[Comment]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(POST_AUTHOR_SENTINEL)
        .chain(comments.iter().map(|comment| comment.name.as_str()))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(ToOwned::to_owned)
        .collect()
}
