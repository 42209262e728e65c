//! Treehole endpoints built on a [`RequestTransport`].

use super::credentials::AmbientCredentials;
use super::envelope::ResponseEnvelope;
use super::error::TreeholeError;
use super::models::{Comment, Page, Post, PostId, SortOrder};
use super::transport::{ApiPath, ApiRequest, HttpTransport, RequestTransport, get_json};

/// Default number of comments requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Ordering and page size for a full comment aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentQuery {
    /// Requested ordering.
    pub sort: SortOrder,
    /// Comments per page; must be positive.
    pub page_size: u32,
}

impl CommentQuery {
    /// Creates a query.
    #[must_use]
    pub const fn new(sort: SortOrder, page_size: u32) -> Self {
        Self { sort, page_size }
    }
}

impl Default for CommentQuery {
    fn default() -> Self {
        Self::new(SortOrder::Asc, DEFAULT_PAGE_SIZE)
    }
}

/// Client for the post and comment endpoints.
#[derive(Debug, Clone)]
pub struct TreeholeClient<Transport> {
    transport: Transport,
}

impl TreeholeClient<HttpTransport> {
    /// Builds a client using the standard HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidUrl`] when `api_base` is invalid or
    /// [`TreeholeError::Configuration`] when the HTTP client cannot be built.
    pub fn for_base(api_base: &str, credentials: AmbientCredentials) -> Result<Self, TreeholeError> {
        HttpTransport::new(api_base, credentials).map(Self::new)
    }
}

impl<Transport> TreeholeClient<Transport>
where
    Transport: RequestTransport,
{
    /// Creates a client on top of `transport`.
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetches a single post.
    ///
    /// # Errors
    ///
    /// Propagates transport failures; a failure envelope is returned as
    /// [`ResponseEnvelope::Failure`], not as an error.
    pub async fn fetch_post(&self, pid: PostId) -> Result<ResponseEnvelope<Post>, TreeholeError> {
        let request = ApiRequest::new(ApiPath::new(format!("pku/{pid}"))?);
        get_json(&self.transport, &request).await
    }

    /// Fetches one page of comments.
    ///
    /// # Errors
    ///
    /// Propagates transport failures; a failure envelope is returned as
    /// [`ResponseEnvelope::Failure`], not as an error.
    pub async fn fetch_comments(
        &self,
        pid: PostId,
        page: u32,
        limit: u32,
        sort: SortOrder,
    ) -> Result<ResponseEnvelope<Page<Comment>>, TreeholeError> {
        let request = ApiRequest::new(ApiPath::new(format!("pku_comment_v3/{pid}"))?)
            .with_query("page", page)
            .with_query("limit", limit)
            .with_query("sort", sort.as_str());
        get_json(&self.transport, &request).await
    }

    /// Fetches every comment page of a post and concatenates them.
    ///
    /// Page 1 fixes `last_page` for the whole run; pages `2..=last_page` are
    /// then requested one at a time in increasing order. Each page is tried
    /// exactly once and the first failure aborts the run, discarding the
    /// comments collected so far.
    ///
    /// # Errors
    ///
    /// Returns [`TreeholeError::InvalidPagination`] for a zero page size,
    /// [`TreeholeError::ApiFailure`] with the server message when any page's
    /// envelope is unsuccessful, and any transport failure unchanged.
    pub async fn fetch_all_comments(
        &self,
        pid: PostId,
        query: CommentQuery,
    ) -> Result<Vec<Comment>, TreeholeError> {
        if query.page_size == 0 {
            return Err(TreeholeError::InvalidPagination {
                message: "page size must be positive".to_owned(),
            });
        }

        let first = self
            .fetch_comments(pid, 1, query.page_size, query.sort)
            .await?
            .into_result()?;
        let last_page = first.last_page;
        tracing::debug!("post {pid}: page 1 of {last_page} fetched");

        let mut comments = first.data;
        for page in 2..=last_page {
            let rows = self
                .fetch_comments(pid, page, query.page_size, query.sort)
                .await?
                .into_result()?;
            tracing::debug!("post {pid}: page {page} of {last_page} fetched");
            comments.extend(rows.data);
        }

        Ok(comments)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
