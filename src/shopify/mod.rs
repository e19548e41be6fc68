pub mod articles;
pub mod client;
pub mod files;
pub mod gid;
pub mod graphql;

pub use articles::ArticleDraft;
pub use client::ShopifyClient;
pub use files::{FileStatus, MediaStatus};
pub use graphql::UserError;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP {0}")]
    Http(u16),
    #[error("graphql errors: {0}")]
    Graphql(String),
    #[error("user errors: {}", join_user_errors(.0))]
    UserErrors(Vec<UserError>),
    #[error("response missing `{0}`")]
    MissingData(&'static str),
    #[error("invalid response: {0}")]
    Decode(String),
}

fn join_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Admin GraphQL operations the content pipeline relies on.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Most recent article titles of a blog, newest first, capped at `limit`.
    async fn recent_article_titles(
        &self,
        blog_id: &str,
        limit: u32,
    ) -> Result<Vec<String>, ShopifyError>;

    /// Submits an external image for ingestion; returns the media object id.
    async fn create_file(&self, source_url: &str) -> Result<String, ShopifyError>;

    async fn media_status(&self, media_id: &str) -> Result<MediaStatus, ShopifyError>;

    /// Returns the created article id.
    async fn create_article(&self, draft: &ArticleDraft) -> Result<String, ShopifyError>;
}
