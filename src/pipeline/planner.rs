use crate::calendar::CalendarStore;
use crate::config::AppConfig;
use crate::llm::ContentGenerator;
use crate::media::{MediaUploader, PollPolicy};
use crate::models::ContentEntry;
use crate::pipeline::{PipelineError, timed};
use crate::shopify::CommerceApi;
use crate::titles::{exclusion_sample, existing_titles};
use crate::topics::{TopicIdea, generate_topics, image_prompt};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub blog_id: String,
    pub blog_key: String,
    pub batch_size: usize,
    pub title_sample_size: usize,
    pub pacing: Duration,
    pub poll: PollPolicy,
}

impl PlannerSettings {
    pub fn from_config(config: &AppConfig, batch_size: usize) -> Self {
        Self {
            blog_id: config.blog_id.clone(),
            blog_key: config.blog_key.clone(),
            batch_size,
            title_sample_size: config.title_sample_size,
            pacing: config.topic_pacing,
            poll: config.poll,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedTopic {
    pub title: String,
    pub stage: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlanSummary {
    pub proposed: usize,
    pub appended: Vec<String>,
    pub skipped: Vec<SkippedTopic>,
}

pub struct Planner<'a> {
    settings: PlannerSettings,
    generator: &'a dyn ContentGenerator,
    commerce: &'a dyn CommerceApi,
    store: &'a CalendarStore,
}

impl<'a> Planner<'a> {
    pub fn new(
        settings: PlannerSettings,
        generator: &'a dyn ContentGenerator,
        commerce: &'a dyn CommerceApi,
        store: &'a CalendarStore,
    ) -> Self {
        Self {
            settings,
            generator,
            commerce,
            store,
        }
    }

    pub async fn run(&self) -> Result<PlanSummary, PipelineError> {
        let key = self.settings.blog_key.as_str();
        let mut calendar = self
            .store
            .load()
            .map_err(|err| PipelineError::storage("load_calendar", err))?;
        calendar.ensure_blog(key);

        let existing = timed(
            "existing_titles",
            existing_titles(self.commerce, &self.settings.blog_id),
        )
        .await;
        let excluded = exclusion_sample(&existing, self.settings.title_sample_size);

        let ideas = timed(
            "generate_topics",
            generate_topics(self.generator, self.settings.batch_size, &excluded),
        )
        .await
        .map_err(|err| PipelineError::from_topic("generate_topics", err))?;

        let mut summary = PlanSummary {
            proposed: ideas.len(),
            ..PlanSummary::default()
        };
        let uploader = MediaUploader::new(self.commerce, self.settings.poll);

        for (index, idea) in ideas.into_iter().enumerate() {
            if index > 0 && !self.settings.pacing.is_zero() {
                sleep(self.settings.pacing).await;
            }
            info!(target = "blog.planner", title = %idea.title, "processing_topic");

            let entry = match self.prepare_entry(&idea, &uploader).await {
                Ok(entry) => entry,
                Err(skipped) => {
                    warn!(
                        target = "blog.planner",
                        title = %skipped.title,
                        stage = skipped.stage,
                        reason = %skipped.reason,
                        "topic_skipped"
                    );
                    summary.skipped.push(skipped);
                    continue;
                }
            };

            calendar.append(key, entry);
            self.store
                .save(&calendar)
                .map_err(|err| PipelineError::storage("save_calendar", err))?;
            summary.appended.push(idea.title);
        }

        info!(
            target = "blog.planner",
            proposed = summary.proposed,
            appended = summary.appended.len(),
            skipped = summary.skipped.len(),
            pending = calendar.pending_count(key),
            "planning_finished"
        );
        Ok(summary)
    }

    async fn prepare_entry(
        &self,
        idea: &TopicIdea,
        uploader: &MediaUploader<'_>,
    ) -> Result<ContentEntry, SkippedTopic> {
        let skip = |stage: &'static str, reason: String| SkippedTopic {
            title: idea.title.clone(),
            stage,
            reason,
        };

        let provider_url = timed(
            "generate_image",
            self.generator.generate_image(&image_prompt(idea)),
        )
        .await
        .map_err(|err| skip("generate_image", err.to_string()))?;

        let durable_url = timed("upload_image", uploader.upload(&provider_url))
            .await
            .map_err(|err| skip("upload_image", err.to_string()))?;

        Ok(ContentEntry::pending(
            idea.title.clone(),
            idea.keywords.clone(),
            durable_url,
            Some(idea.alt_text().unwrap_or_else(|| idea.title.clone())),
        ))
    }
}
