//! High-level intake facade used by the CLI.

use super::client::{CommentQuery, TreeholeClient};
use super::error::TreeholeError;
use super::models::{Aggregate, PostId};
use super::transport::RequestTransport;

/// Loads a post and its complete thread into an [`Aggregate`].
pub struct ThreadIntake<'client, Transport>
where
    Transport: RequestTransport,
{
    client: &'client TreeholeClient<Transport>,
}

impl<'client, Transport> ThreadIntake<'client, Transport>
where
    Transport: RequestTransport,
{
    /// Create a new intake facade using the provided client.
    #[must_use]
    pub const fn new(client: &'client TreeholeClient<Transport>) -> Self {
        Self { client }
    }

    /// Load the post and all of its comments.
    ///
    /// The post request runs concurrently with the comment aggregation; the
    /// comment pages themselves stay strictly sequential.
    ///
    /// # Errors
    ///
    /// Returns the first failure from either side: a failure envelope for the
    /// post becomes [`TreeholeError::ApiFailure`], and comment aggregation
    /// errors are propagated unchanged.
    pub async fn load(&self, pid: PostId, query: CommentQuery) -> Result<Aggregate, TreeholeError> {
        let (post, comments) = tokio::try_join!(
            async { self.client.fetch_post(pid).await?.into_result() },
            self.client.fetch_all_comments(pid, query),
        )?;

        let aggregate = Aggregate::assemble(post, comments);
        tracing::info!(
            "post {pid}: loaded {} comments from {} participants",
            aggregate.comments.len(),
            aggregate.users.len()
        );
        Ok(aggregate)
    }
}

#[cfg(test)]
#[path = "intake_tests.rs"]
mod tests;
