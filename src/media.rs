//! Asynchronous media ingestion.
//!
//! The platform fetches an external image on its own schedule and offers no
//! completion callback, so an upload is a `fileCreate` submission followed by
//! bounded polling of the created media object until a durable URL appears.

use crate::shopify::{CommerceApi, FileStatus, ShopifyError};
use crate::metrics::{Timer, millis};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl PollPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(3))
    }
}

/// A submitted image whose durable URL is not known yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub media_id: String,
    pub source_url: String,
    pub attempts: u32,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file creation failed: {0}")]
    Submit(#[source] ShopifyError),
    #[error("media `{media_id}` not ready after {attempts} attempts")]
    Timeout { media_id: String, attempts: u32 },
    #[error("media `{media_id}` failed processing")]
    ProcessingFailed { media_id: String },
}

impl UploadError {
    pub fn outcome(&self) -> &'static str {
        match self {
            UploadError::Submit(_) => "submit_failed",
            UploadError::Timeout { .. } => "timeout",
            UploadError::ProcessingFailed { .. } => "processing_failed",
        }
    }
}

pub struct MediaUploader<'a> {
    api: &'a dyn CommerceApi,
    policy: PollPolicy,
}

impl<'a> MediaUploader<'a> {
    pub fn new(api: &'a dyn CommerceApi, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    /// Transport, GraphQL and `userErrors` failures all surface as `Submit`.
    pub async fn submit(&self, source_url: &str) -> Result<PendingUpload, UploadError> {
        let media_id = self
            .api
            .create_file(source_url)
            .await
            .map_err(UploadError::Submit)?;
        Ok(PendingUpload {
            media_id,
            source_url: source_url.to_string(),
            attempts: 0,
        })
    }

    pub async fn poll(&self, mut pending: PendingUpload) -> Result<String, UploadError> {
        while pending.attempts < self.policy.max_attempts {
            if !self.policy.delay.is_zero() {
                sleep(self.policy.delay).await;
            }
            pending.attempts += 1;

            let status = match self.api.media_status(&pending.media_id).await {
                Ok(status) => status,
                Err(err) => {
                    warn!(
                        target = "blog.media",
                        media_id = %pending.media_id,
                        attempt = pending.attempts,
                        error = %err,
                        "media_status_query_failed"
                    );
                    continue;
                }
            };

            if let Some(url) = status.url
                && url != pending.source_url
            {
                return Ok(url);
            }
            if status.status == FileStatus::Failed {
                return Err(UploadError::ProcessingFailed {
                    media_id: pending.media_id,
                });
            }
            debug!(
                target = "blog.media",
                media_id = %pending.media_id,
                attempt = pending.attempts,
                status = ?status.status,
                "media_not_ready"
            );
        }

        Err(UploadError::Timeout {
            media_id: pending.media_id,
            attempts: pending.attempts,
        })
    }

    /// Submit then poll. Callers only see a durable URL or a failure.
    pub async fn upload(&self, source_url: &str) -> Result<String, UploadError> {
        let timer = Timer::start("media_upload");
        let result = match self.submit(source_url).await {
            Ok(pending) => self.poll(pending).await,
            Err(err) => Err(err),
        };
        match &result {
            Ok(url) => {
                let elapsed = timer.finish_upload("ready");
                info!(target = "blog.media", url = %url, elapsed_ms = millis(elapsed), "media_ready");
            }
            Err(err) => {
                timer.finish_upload(err.outcome());
                warn!(target = "blog.media", outcome = err.outcome(), error = %err, "media_upload_failed");
            }
        }
        result
    }
}
