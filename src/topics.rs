use crate::llm::{ContentGenerator, LlmError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

const FENCE: &str = "```";
const IMAGE_STYLE_PREFIX: &str =
    "A high quality, photorealistic image related to running and fitness.";

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("llm request failed: {0}")]
    Llm(#[from] LlmError),
    #[error("content malformed: {0}")]
    ContentMalformed(String),
}

/// One topic proposal as returned by the text model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicIdea {
    pub title: String,
    pub image_prompt: String,
    #[serde(default, alias = "alt", alias = "image_alt")]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TopicIdea {
    pub fn alt_text(&self) -> Option<String> {
        self.alt_text
            .as_deref()
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(str::to_string)
    }
}

pub fn topics_prompt(count: usize, excluded_titles: &[String]) -> String {
    format!(
        "Generate {count} unique, engaging blog titles in HEBREW for a Running & Fitness blog. \
         Focus on: Running tips, marathon training, running accessories (specifically phone armbands), and healthy lifestyle. \
         Rules:\n\
         1. Output strictly a JSON array of objects.\n\
         2. Keys: 'title' (Hebrew string), 'image_prompt' (English visual description for DALL-E), \
         'alt_text' (short Hebrew description of the image), 'keywords' (list of Hebrew keywords).\n\
         3. Do NOT use these titles: {excluded}",
        excluded = excluded_titles.join(", "),
    )
}

pub fn image_prompt(idea: &TopicIdea) -> String {
    format!("{IMAGE_STYLE_PREFIX} {}", idea.image_prompt.trim())
}

pub fn article_prompt(title: &str, keywords: &[String]) -> String {
    format!(
        "Write a comprehensive SEO blog post in HEBREW (עברית).\n\
         Title: {title}\n\
         Keywords: {keywords}\n\n\
         Rules:\n\
         1. **Language:** Hebrew ONLY.\n\
         2. **Structure:** Use <h2> and <h3> tags. Start with an engaging summary.\n\
         3. **Tone:** Energetic, motivating, professional fitness advice.\n\
         4. **Brand:** Mention 'הופספורט' (Hopsport) naturally as a top brand for running accessories.\n\
         5. **Format:** HTML Body only (no <html> tags). Use bullet points where appropriate.\n\
         6. **No Images:** Do not insert <img> tags in the text.",
        keywords = keywords.join(", "),
    )
}

/// Removes a surrounding markdown code fence (with or without a language tag).
/// The closing fence may sit on its own line or at the end of the last content line.
pub fn strip_code_fence(input: &str) -> String {
    let trimmed = input.trim();
    let Some(opened) = trimmed.strip_prefix(FENCE) else {
        return trimmed.to_string();
    };
    let body = match opened.split_once('\n') {
        Some((_tag, body)) => body,
        None => opened,
    };
    let body = match body.find(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };
    body.trim().to_string()
}

/// Decodes the model's topic list. Items with a blank title or image prompt are dropped.
pub fn parse_topics(text: &str, max: usize) -> Result<Vec<TopicIdea>, TopicError> {
    let cleaned = strip_code_fence(text);
    let ideas: Vec<TopicIdea> = serde_json::from_str(&cleaned)
        .map_err(|err| TopicError::ContentMalformed(err.to_string()))?;

    let mut accepted = Vec::with_capacity(ideas.len().min(max));
    for mut idea in ideas {
        if accepted.len() >= max {
            break;
        }
        idea.title = idea.title.trim().to_string();
        if idea.title.is_empty() || idea.image_prompt.trim().is_empty() {
            warn!(target = "blog.planner", title = %idea.title, "topic_incomplete_dropped");
            continue;
        }
        idea.keywords.retain(|keyword| !keyword.trim().is_empty());
        accepted.push(idea);
    }
    Ok(accepted)
}

pub async fn generate_topics(
    generator: &dyn ContentGenerator,
    count: usize,
    excluded_titles: &[String],
) -> Result<Vec<TopicIdea>, TopicError> {
    info!(target = "blog.planner", count, excluded = excluded_titles.len(), "generating_topics");
    let text = generator
        .complete_text(&topics_prompt(count, excluded_titles))
        .await?;
    parse_topics(&text, count)
}

pub async fn generate_article_body(
    generator: &dyn ContentGenerator,
    title: &str,
    keywords: &[String],
) -> Result<String, TopicError> {
    let text = generator
        .complete_text(&article_prompt(title, keywords))
        .await?;
    let body = strip_code_fence(&text);
    if body.is_empty() {
        return Err(TopicError::ContentMalformed("empty article body".into()));
    }
    Ok(body)
}
