use crate::http::HttpSettings;
use crate::media::PollPolicy;
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

pub const DEFAULT_AUTHOR: &str = "צוות הופספורט";
pub const DEFAULT_API_VERSION: &str = "2024-01";
pub const DEFAULT_CALENDAR_PATH: &str = "content_calendar.json";
pub const DEFAULT_BLOG_KEY: &str = "running";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub shop_domain: String,
    pub access_token: String,
    pub api_version: String,
    pub blog_id: String,
    pub blog_key: String,
    pub author_name: String,
    pub calendar_path: PathBuf,
    pub openai: OpenAiSettings,
    pub poll: PollPolicy,
    pub topic_pacing: Duration,
    pub title_sample_size: usize,
    pub http: HttpSettings,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub temperature: f32,
}

/// Location of the content calendar; the only settings `status` needs.
#[derive(Debug, Clone)]
pub struct CalendarLocation {
    pub path: PathBuf,
    pub blog_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let location = CalendarLocation::from_vars(&vars);

        let poll = PollPolicy::new(
            vars.parsed("MEDIA_POLL_ATTEMPTS", 10_u32)?,
            Duration::from_secs(vars.parsed("MEDIA_POLL_DELAY_SECS", 3_u64)?),
        );
        if poll.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "MEDIA_POLL_ATTEMPTS",
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            shop_domain: normalize_shop_domain(&vars.required("SHOP_DOMAIN")?),
            access_token: vars.required("SHOPIFY_TOKEN")?,
            api_version: vars.or("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            blog_id: vars.required("BLOG_ID_RUNNING")?,
            blog_key: location.blog_key,
            author_name: vars.or("AUTHOR_NAME", DEFAULT_AUTHOR),
            calendar_path: location.path,
            openai: OpenAiSettings {
                api_key: vars.required("OPENAI_API_KEY")?,
                base_url: vars
                    .or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                text_model: vars.or("OPENAI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
                image_model: vars.or("OPENAI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
                temperature: vars.parsed("OPENAI_TEMPERATURE", 0.7_f32)?,
            },
            poll,
            topic_pacing: Duration::from_secs(vars.parsed("TOPIC_PACING_SECS", 2_u64)?),
            title_sample_size: vars.parsed("TITLE_SAMPLE_SIZE", 20_usize)?,
            http: HttpSettings {
                timeout: Duration::from_secs(vars.parsed("HTTP_TIMEOUT_SECS", 60_u64)?),
                connect_timeout: Duration::from_secs(
                    vars.parsed("HTTP_CONNECT_TIMEOUT_SECS", 5_u64)?,
                ),
            },
        })
    }

    pub fn graphql_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.shop_domain, self.api_version
        )
    }
}

impl CalendarLocation {
    pub fn from_env() -> Self {
        Self::from_vars(&Vars(|key: &str| env::var(key).ok()))
    }

    fn from_vars<F>(vars: &Vars<F>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            path: PathBuf::from(vars.or("CALENDAR_PATH", DEFAULT_CALENDAR_PATH)),
            blog_key: vars.or("BLOG_KEY", DEFAULT_BLOG_KEY),
        }
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|err| ConfigError::Invalid {
                key,
                reason: format!("{raw:?}: {err}"),
            }),
        }
    }
}

fn normalize_shop_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}
