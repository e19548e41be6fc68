use crate::calendar::CalendarStore;
use crate::config::AppConfig;
use crate::llm::ContentGenerator;
use crate::pipeline::{PipelineError, timed};
use crate::shopify::gid::blog_gid;
use crate::shopify::{ArticleDraft, CommerceApi};
use crate::topics::generate_article_body;
use crate::widget::{PRODUCT_WIDGET, inject_widget};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PublisherSettings {
    pub blog_id: String,
    pub blog_key: String,
    pub author_name: String,
    pub dry_run: bool,
}

impl PublisherSettings {
    pub fn from_config(config: &AppConfig, dry_run: bool) -> Self {
        Self {
            blog_id: config.blog_id.clone(),
            blog_key: config.blog_key.clone(),
            author_name: config.author_name.clone(),
            dry_run,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    NothingPending,
    Published {
        title: String,
        article_id: String,
        published_at: NaiveDate,
    },
    /// Dry run: the article was composed but not sent.
    Previewed(ArticleDraft),
}

pub struct Publisher<'a> {
    settings: PublisherSettings,
    generator: &'a dyn ContentGenerator,
    commerce: &'a dyn CommerceApi,
    store: &'a CalendarStore,
}

impl<'a> Publisher<'a> {
    pub fn new(
        settings: PublisherSettings,
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

    pub async fn run(&self) -> Result<PublishOutcome, PipelineError> {
        self.run_on(Local::now().date_naive()).await
    }

    /// Publishes the oldest pending entry, stamping it with `today`.
    pub async fn run_on(&self, today: NaiveDate) -> Result<PublishOutcome, PipelineError> {
        let key = self.settings.blog_key.as_str();
        if !self.store.exists() {
            info!(
                target = "blog.publisher",
                path = %self.store.path().display(),
                "calendar_not_found_run_planner_first"
            );
            return Ok(PublishOutcome::NothingPending);
        }
        let mut calendar = self
            .store
            .load()
            .map_err(|err| PipelineError::storage("load_calendar", err))?;

        let Some(index) = calendar.next_pending(key) else {
            info!(target = "blog.publisher", blog = key, "no_pending_articles");
            return Ok(PublishOutcome::NothingPending);
        };
        let entry = calendar.entries(key)[index].clone();
        info!(target = "blog.publisher", title = %entry.title, "publishing");

        let body = timed(
            "generate_body",
            generate_article_body(self.generator, &entry.title, &entry.keywords),
        )
        .await
        .map_err(|err| PipelineError::from_topic("generate_body", err))?;

        let draft = ArticleDraft {
            blog_id: blog_gid(&self.settings.blog_id),
            title: entry.title.clone(),
            author_name: self.settings.author_name.clone(),
            body_html: inject_widget(&body, &PRODUCT_WIDGET),
            image_url: Some(entry.image_url.clone()),
            image_alt: Some(entry.alt_text().to_string()),
            tags: entry.keywords.clone(),
            is_published: true,
        };

        if self.settings.dry_run {
            info!(
                target = "blog.publisher",
                title = %draft.title,
                body_bytes = draft.body_html.len(),
                "dry_run_preview"
            );
            return Ok(PublishOutcome::Previewed(draft));
        }

        let article_id = timed("create_article", self.commerce.create_article(&draft))
            .await
            .map_err(|err| {
                warn!(target = "blog.publisher", title = %draft.title, error = %err, "publish_failed");
                PipelineError::upstream("create_article", err.to_string())
            })?;

        if let Some(stored) = calendar.entry_mut(key, index) {
            stored.mark_published(today);
        }
        self.store
            .save(&calendar)
            .map_err(|err| PipelineError::storage("save_calendar", err))?;

        info!(target = "blog.publisher", title = %entry.title, article_id = %article_id, "article_live");
        Ok(PublishOutcome::Published {
            title: entry.title,
            article_id,
            published_at: today,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ContentCalendar;
    use crate::models::{ContentEntry, EntryStatus};
    use crate::pipeline::PipelineErrorKind;
    use crate::testing::{FakeCommerce, FakeGenerator};
    use std::fs;
    use tempfile::TempDir;

    const BODY: &str = "<p>פתיחה אנרגטית</p><h2>חימום</h2><p>עוד תוכן</p>";

    fn settings() -> PublisherSettings {
        PublisherSettings {
            blog_id: "90183418201".into(),
            blog_key: "running".into(),
            author_name: "צוות הופספורט".into(),
            dry_run: false,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn seeded_store(dir: &TempDir, titles: &[&str]) -> CalendarStore {
        let store = CalendarStore::new(dir.path().join("content_calendar.json"));
        let mut calendar = ContentCalendar::default();
        calendar.ensure_blog("running");
        for (i, title) in titles.iter().enumerate() {
            calendar.append(
                "running",
                ContentEntry::pending(
                    *title,
                    vec!["ריצה".into(), "מרתון".into()],
                    format!("https://cdn.shopify.com/s/files/{i}.png"),
                    Some(format!("תמונה עבור {title}")),
                ),
            );
        }
        store.save(&calendar).unwrap();
        store
    }

    #[tokio::test]
    async fn publishes_oldest_pending_and_second_run_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, &["ראשון"]);
        let generator = FakeGenerator::new().with_text(BODY);
        let commerce = FakeCommerce::new();
        let publisher = Publisher::new(settings(), &generator, &commerce, &store);

        let outcome = publisher.run_on(today()).await.expect("publish");
        assert_eq!(
            outcome,
            PublishOutcome::Published {
                title: "ראשון".into(),
                article_id: "gid://shopify/Article/1".into(),
                published_at: today(),
            }
        );

        let calendar = store.load().unwrap();
        let entry = &calendar.entries("running")[0];
        assert_eq!(entry.status(), EntryStatus::Published);
        assert_eq!(entry.published_at(), Some(today()));

        let before = fs::read(store.path()).unwrap();
        let again = publisher.run_on(today()).await.expect("second run");
        assert_eq!(again, PublishOutcome::NothingPending);
        assert_eq!(fs::read(store.path()).unwrap(), before);
        assert_eq!(commerce.state().articles.len(), 1);
    }

    #[tokio::test]
    async fn fifo_selection_among_several_pending() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, &["ראשון", "שני", "שלישי"]);
        let generator = FakeGenerator::new().with_text(BODY).with_text(BODY);
        let commerce = FakeCommerce::new();
        let publisher = Publisher::new(settings(), &generator, &commerce, &store);

        publisher.run_on(today()).await.unwrap();
        publisher.run_on(today()).await.unwrap();

        let calendar = store.load().unwrap();
        let statuses: Vec<EntryStatus> = calendar
            .entries("running")
            .iter()
            .map(ContentEntry::status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                EntryStatus::Published,
                EntryStatus::Published,
                EntryStatus::Pending
            ]
        );
        let sent: Vec<String> = commerce
            .state()
            .articles
            .iter()
            .map(|a| a.title.clone())
            .collect();
        assert_eq!(sent, vec!["ראשון", "שני"]);
    }

    #[tokio::test]
    async fn article_carries_widget_image_tags_and_global_blog_id() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, &["ראשון"]);
        let generator = FakeGenerator::new().with_text(&format!("```html\n{BODY}\n```"));
        let commerce = FakeCommerce::new();

        Publisher::new(settings(), &generator, &commerce, &store)
            .run_on(today())
            .await
            .unwrap();

        let state = commerce.state();
        let draft = &state.articles[0];
        assert_eq!(draft.blog_id, "gid://shopify/Blog/90183418201");
        assert_eq!(draft.author_name, "צוות הופספורט");
        assert_eq!(draft.image_url.as_deref(), Some("https://cdn.shopify.com/s/files/0.png"));
        assert_eq!(draft.image_alt.as_deref(), Some("תמונה עבור ראשון"));
        assert_eq!(draft.tags, vec!["ריצה", "מרתון"]);
        assert!(draft.is_published);
        let expected = format!(
            "<p>פתיחה אנרגטית</p>{}<h2>חימום</h2><p>עוד תוכן</p>",
            PRODUCT_WIDGET.as_str()
        );
        assert_eq!(draft.body_html, expected);
    }

    #[tokio::test]
    async fn rejected_publish_leaves_entry_pending() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, &["ראשון"]);
        let before = fs::read(store.path()).unwrap();
        let generator = FakeGenerator::new().with_text(BODY);
        let commerce = FakeCommerce::new().configure(|s| s.article_rejected = true);

        let err = Publisher::new(settings(), &generator, &commerce, &store)
            .run_on(today())
            .await
            .expect_err("rejected");

        assert_eq!(err.stage(), "create_article");
        assert_eq!(err.kind(), PipelineErrorKind::Upstream);
        assert_eq!(fs::read(store.path()).unwrap(), before);
        assert!(store.load().unwrap().entries("running")[0].is_pending());
    }

    #[tokio::test]
    async fn body_generation_failure_leaves_entry_pending() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, &["ראשון"]);
        let generator =
            FakeGenerator::new().configure(|s| s.text_replies.push_back(Err("timeout".into())));
        let commerce = FakeCommerce::new();

        let err = Publisher::new(settings(), &generator, &commerce, &store)
            .run_on(today())
            .await
            .expect_err("llm down");
        assert_eq!(err.stage(), "generate_body");
        assert!(commerce.state().articles.is_empty());
        assert_eq!(store.load().unwrap().pending_count("running"), 1);
    }

    #[tokio::test]
    async fn nothing_pending_leaves_file_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content_calendar.json");
        let raw = "{\"running\": [{\"title\": \"x\", \"keywords\": [], \"image_url\": \"https://cdn.shopify.com/x.png\", \"status\": \"published\", \"published_at\": \"2026-01-01\"}]}";
        fs::write(&path, raw).unwrap();
        let store = CalendarStore::new(&path);
        let generator = FakeGenerator::new();
        let commerce = FakeCommerce::new();

        let outcome = Publisher::new(settings(), &generator, &commerce, &store)
            .run_on(today())
            .await
            .unwrap();

        assert_eq!(outcome, PublishOutcome::NothingPending);
        assert_eq!(fs::read_to_string(&path).unwrap(), raw);
        assert!(generator.state().text_prompts.is_empty());
    }

    #[tokio::test]
    async fn missing_calendar_is_nothing_to_publish() {
        let dir = TempDir::new().unwrap();
        let store = CalendarStore::new(dir.path().join("content_calendar.json"));
        let generator = FakeGenerator::new();
        let commerce = FakeCommerce::new();

        let outcome = Publisher::new(settings(), &generator, &commerce, &store)
            .run_on(today())
            .await
            .unwrap();
        assert_eq!(outcome, PublishOutcome::NothingPending);
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn dry_run_composes_without_mutation() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, &["ראשון"]);
        let before = fs::read(store.path()).unwrap();
        let generator = FakeGenerator::new().with_text(BODY);
        let commerce = FakeCommerce::new();
        let settings = PublisherSettings {
            dry_run: true,
            ..settings()
        };

        let outcome = Publisher::new(settings, &generator, &commerce, &store)
            .run_on(today())
            .await
            .unwrap();

        match outcome {
            PublishOutcome::Previewed(draft) => assert!(draft.body_html.contains("הופספורט")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(commerce.state().articles.is_empty());
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }
}
