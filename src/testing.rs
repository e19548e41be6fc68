//! In-process fakes for the AI provider and the commerce platform.

use crate::llm::{ContentGenerator, LlmError};
use crate::shopify::{ArticleDraft, CommerceApi, FileStatus, MediaStatus, ShopifyError, UserError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

pub const PROVIDER_HOST: &str = "https://oaidalleapiprodscus.blob.core.windows.net/";
pub const CDN_HOST: &str = "https://cdn.shopify.com/";

#[derive(Default)]
pub struct GeneratorState {
    /// Replies for text completions, consumed in order.
    pub text_replies: VecDeque<Result<String, String>>,
    /// Image prompts containing any of these fragments fail.
    pub failing_image_prompts: Vec<String>,
    pub text_prompts: Vec<String>,
    pub image_prompts: Vec<String>,
}

#[derive(Default)]
pub struct FakeGenerator {
    state: Mutex<GeneratorState>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, reply: &str) -> Self {
        self.configure(|s| s.text_replies.push_back(Ok(reply.to_string())))
    }

    pub fn configure(self, f: impl FnOnce(&mut GeneratorState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, GeneratorState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn complete_text(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.state();
        state.text_prompts.push(prompt.to_string());
        match state.text_replies.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::Http(message)),
            None => Err(LlmError::InvalidResponse("no scripted reply".into())),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.state();
        state.image_prompts.push(prompt.to_string());
        if state
            .failing_image_prompts
            .iter()
            .any(|fragment| prompt.contains(fragment.as_str()))
        {
            return Err(LlmError::Api {
                status: 400,
                message: "content policy violation".into(),
            });
        }
        Ok(format!(
            "{PROVIDER_HOST}private/img-{}.png",
            state.image_prompts.len()
        ))
    }
}

#[derive(Default)]
pub struct CommerceState {
    pub titles: Vec<String>,
    pub titles_fail: bool,
    pub rejected_sources: Vec<String>,
    pub file_create_graphql_error: bool,
    /// Number of successful status queries before a media object reports its URL.
    pub ready_after: u32,
    pub never_ready: bool,
    pub processing_fails: bool,
    pub echo_source: bool,
    /// The first N status queries fail at the transport level.
    pub status_query_failures: u32,
    pub article_rejected: bool,
    pub submitted_sources: Vec<String>,
    pub status_queries: u32,
    pub attempts_by_media: HashMap<String, u32>,
    pub articles: Vec<ArticleDraft>,
}

#[derive(Default)]
pub struct FakeCommerce {
    state: Mutex<CommerceState>,
}

impl FakeCommerce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(self, f: impl FnOnce(&mut CommerceState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, CommerceState> {
        self.state.lock().unwrap()
    }
}

fn media_index(media_id: &str) -> usize {
    media_id
        .rsplit('/')
        .next()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

#[async_trait]
impl CommerceApi for FakeCommerce {
    async fn recent_article_titles(
        &self,
        _blog_id: &str,
        limit: u32,
    ) -> Result<Vec<String>, ShopifyError> {
        let state = self.state();
        if state.titles_fail {
            return Err(ShopifyError::Request("connection reset".into()));
        }
        Ok(state.titles.iter().take(limit as usize).cloned().collect())
    }

    async fn create_file(&self, source_url: &str) -> Result<String, ShopifyError> {
        let mut state = self.state();
        if state.file_create_graphql_error {
            return Err(ShopifyError::Graphql("Throttled".into()));
        }
        if state.rejected_sources.iter().any(|s| s == source_url) {
            return Err(ShopifyError::UserErrors(vec![UserError {
                field: Some(vec!["files".into(), "0".into(), "originalSource".into()]),
                message: "Image URL is invalid".into(),
            }]));
        }
        state.submitted_sources.push(source_url.to_string());
        Ok(format!(
            "gid://shopify/MediaImage/{}",
            state.submitted_sources.len()
        ))
    }

    async fn media_status(&self, media_id: &str) -> Result<MediaStatus, ShopifyError> {
        let mut state = self.state();
        state.status_queries += 1;
        if state.status_query_failures > 0 {
            state.status_query_failures -= 1;
            return Err(ShopifyError::Request("timed out".into()));
        }
        if state.processing_fails {
            return Ok(MediaStatus {
                status: FileStatus::Failed,
                url: None,
            });
        }
        let index = media_index(media_id);
        if state.echo_source {
            let source = state
                .submitted_sources
                .get(index.saturating_sub(1))
                .cloned();
            return Ok(MediaStatus {
                status: FileStatus::Ready,
                url: source,
            });
        }
        let ready_after = state.ready_after.max(1);
        let never_ready = state.never_ready;
        let attempts = state
            .attempts_by_media
            .entry(media_id.to_string())
            .or_default();
        *attempts += 1;
        if never_ready || *attempts < ready_after {
            return Ok(MediaStatus {
                status: FileStatus::Processing,
                url: None,
            });
        }
        Ok(MediaStatus {
            status: FileStatus::Ready,
            url: Some(format!("{CDN_HOST}s/files/1/0533/2089/files/blog-{index}.png")),
        })
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<String, ShopifyError> {
        let mut state = self.state();
        if state.article_rejected {
            return Err(ShopifyError::UserErrors(vec![UserError {
                field: Some(vec!["article".into(), "image".into()]),
                message: "Image could not be processed".into(),
            }]));
        }
        state.articles.push(draft.clone());
        Ok(format!("gid://shopify/Article/{}", state.articles.len()))
    }
}
