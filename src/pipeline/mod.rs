pub mod planner;
pub mod publisher;

pub use planner::{PlanSummary, Planner, PlannerSettings, SkippedTopic};
pub use publisher::{PublishOutcome, Publisher, PublisherSettings};

use crate::calendar::CalendarError;
use crate::metrics::Timer;
use crate::topics::TopicError;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("stage `{stage}` failed: {message}")]
pub struct PipelineError {
    stage: &'static str,
    message: String,
    kind: PipelineErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// An external call failed or was rejected.
    Upstream,
    /// Generated content could not be decoded.
    Malformed,
    /// The calendar could not be read or written.
    Storage,
}

impl PipelineError {
    pub fn upstream(stage: &'static str, message: impl Into<String>) -> Self {
        Self::new(stage, message, PipelineErrorKind::Upstream)
    }

    pub fn malformed(stage: &'static str, message: impl Into<String>) -> Self {
        Self::new(stage, message, PipelineErrorKind::Malformed)
    }

    pub fn storage(stage: &'static str, err: CalendarError) -> Self {
        Self::new(stage, err.to_string(), PipelineErrorKind::Storage)
    }

    pub fn from_topic(stage: &'static str, err: TopicError) -> Self {
        match err {
            TopicError::ContentMalformed(message) => Self::malformed(stage, message),
            TopicError::Llm(err) => Self::upstream(stage, err.to_string()),
        }
    }

    fn new(stage: &'static str, message: impl Into<String>, kind: PipelineErrorKind) -> Self {
        Self {
            stage,
            message: message.into(),
            kind,
        }
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn kind(&self) -> PipelineErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.message
    }
}

/// Awaits a stage and records how long it took.
pub(crate) async fn timed<T, Fut>(stage: &'static str, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let timer = Timer::start(stage);
    let out = fut.await;
    timer.finish_stage();
    out
}
