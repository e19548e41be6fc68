use crate::config::AppConfig;
use crate::shopify::articles::{
    ARTICLE_CREATE, ArticleCreateData, ArticleCreateVariables, ArticleDraft, RECENT_TITLES,
    RecentTitlesData, RecentTitlesVariables,
};
use crate::shopify::files::{
    FILE_CREATE, FileCreateData, FileCreateVariables, MEDIA_STATUS, MediaStatus, MediaStatusData,
    NodeVariables,
};
use crate::shopify::gid::blog_gid;
use crate::shopify::graphql::GraphqlClient;
use crate::shopify::{CommerceApi, ShopifyError};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ShopifyClient {
    graphql: GraphqlClient,
}

impl ShopifyClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            graphql: GraphqlClient::new(
                config.graphql_endpoint(),
                config.access_token.clone(),
                &config.http,
            ),
        }
    }
}

#[async_trait]
impl CommerceApi for ShopifyClient {
    async fn recent_article_titles(
        &self,
        blog_id: &str,
        limit: u32,
    ) -> Result<Vec<String>, ShopifyError> {
        let blog_id = blog_gid(blog_id);
        let data: RecentTitlesData = self
            .graphql
            .execute(
                "blog.articles",
                RECENT_TITLES,
                RecentTitlesVariables {
                    blog_id: &blog_id,
                    first: limit,
                },
            )
            .await?;
        Ok(data.into_titles())
    }

    async fn create_file(&self, source_url: &str) -> Result<String, ShopifyError> {
        let data: FileCreateData = self
            .graphql
            .execute("fileCreate", FILE_CREATE, FileCreateVariables::image(source_url))
            .await?;
        let id = data.into_file_id()?;
        debug!(target = "blog.shopify", media_id = %id, "file_created");
        Ok(id)
    }

    async fn media_status(&self, media_id: &str) -> Result<MediaStatus, ShopifyError> {
        let data: MediaStatusData = self
            .graphql
            .execute("node", MEDIA_STATUS, NodeVariables { id: media_id })
            .await?;
        Ok(data.into_status())
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<String, ShopifyError> {
        let data: ArticleCreateData = self
            .graphql
            .execute(
                "articleCreate",
                ARTICLE_CREATE,
                ArticleCreateVariables::from(draft),
            )
            .await?;
        data.into_article_id()
    }
}
