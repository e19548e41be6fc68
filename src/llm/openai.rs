use crate::config::OpenAiSettings;
use crate::http::{HttpSettings, build_client};
use crate::llm::{ContentGenerator, LlmError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const IMAGE_SIZE: &str = "1024x1024";

pub struct OpenAiClient {
    http: Client,
    settings: OpenAiSettings,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings, http: &HttpSettings) -> Self {
        Self {
            http: build_client(http),
            settings,
        }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, LlmError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{path}", self.settings.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| LlmError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl ContentGenerator for OpenAiClient {
    async fn complete_text(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.settings.text_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
        };
        debug!(target = "blog.llm", model = %self.settings.text_model, "chat_completion");
        let payload: ChatResponse = self.post("chat/completions", &body).await?;
        extract_text(payload)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ImageRequest {
            model: &self.settings.image_model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
        };
        debug!(target = "blog.llm", model = %self.settings.image_model, "image_generation");
        let payload: ImageResponse = self.post("images/generations", &body).await?;
        extract_image_url(payload)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn extract_text(payload: ChatResponse) -> Result<String, LlmError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("missing text".into()))
}

fn extract_image_url(payload: ImageResponse) -> Result<String, LlmError> {
    payload
        .data
        .into_iter()
        .find_map(|item| item.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("missing image url".into()))
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}
