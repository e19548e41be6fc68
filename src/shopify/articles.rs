use crate::shopify::ShopifyError;
use crate::shopify::graphql::{UserError, reject_user_errors};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Upper bound on titles fetched for de-duplication.
pub const TITLE_WINDOW: u32 = 100;

pub const RECENT_TITLES: &str = r#"
query getArticles($blogId: ID!, $first: Int!) {
  blog(id: $blogId) {
    articles(first: $first, reverse: true) {
      edges { node { title } }
    }
  }
}
"#;

pub const ARTICLE_CREATE: &str = r#"
mutation CreateArticle($article: ArticleCreateInput!) {
  articleCreate(article: $article) {
    article { id }
    userErrors { field message }
  }
}
"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTitlesVariables<'a> {
    pub blog_id: &'a str,
    pub first: u32,
}

#[derive(Debug, Deserialize)]
pub struct RecentTitlesData {
    pub blog: Option<BlogNode>,
}

#[derive(Debug, Deserialize)]
pub struct BlogNode {
    pub articles: Connection,
}

#[derive(Debug, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
pub struct Edge {
    pub node: TitleNode,
}

#[derive(Debug, Deserialize)]
pub struct TitleNode {
    pub title: String,
}

impl RecentTitlesData {
    pub fn into_titles(self) -> Vec<String> {
        self.blog
            .map(|blog| {
                blog.articles
                    .edges
                    .into_iter()
                    .map(|edge| edge.node.title)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Article ready to be sent to the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDraft {
    pub blog_id: String,
    pub title: String,
    pub author_name: String,
    pub body_html: String,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
}

#[derive(Debug, Serialize)]
pub struct ArticleCreateVariables<'a> {
    pub article: ArticleCreateInput<'a>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCreateInput<'a> {
    pub blog_id: &'a str,
    pub title: &'a str,
    pub author: AuthorInput<'a>,
    pub body: &'a str,
    pub image: Option<ArticleImageInput<'a>>,
    pub tags: &'a [String],
    pub is_published: bool,
}

#[derive(Debug, Serialize)]
pub struct AuthorInput<'a> {
    pub name: &'a str,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleImageInput<'a> {
    pub url: &'a str,
    pub alt_text: Option<&'a str>,
}

impl<'a> From<&'a ArticleDraft> for ArticleCreateVariables<'a> {
    fn from(draft: &'a ArticleDraft) -> Self {
        Self {
            article: ArticleCreateInput {
                blog_id: &draft.blog_id,
                title: &draft.title,
                author: AuthorInput {
                    name: &draft.author_name,
                },
                body: &draft.body_html,
                image: draft.image_url.as_deref().map(|url| ArticleImageInput {
                    url,
                    alt_text: draft.image_alt.as_deref(),
                }),
                tags: &draft.tags,
                is_published: draft.is_published,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCreateData {
    pub article_create: Option<ArticleCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCreatePayload {
    pub article: Option<CreatedArticle>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedArticle {
    pub id: String,
}

impl ArticleCreateData {
    pub fn into_article_id(self) -> Result<String, ShopifyError> {
        let payload = self
            .article_create
            .ok_or(ShopifyError::MissingData("articleCreate"))?;
        reject_user_errors(payload.user_errors)?;
        payload
            .article
            .map(|article| article.id)
            .ok_or(ShopifyError::MissingData("articleCreate.article"))
    }
}
