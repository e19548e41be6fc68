use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Published,
}

/// One planned article in the content calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentEntry {
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_at: Option<NaiveDate>,
    /// Fields this tool does not know about, kept so rewrites do not drop hand edits.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ContentEntry {
    pub fn pending(
        title: impl Into<String>,
        keywords: Vec<String>,
        image_url: impl Into<String>,
        image_alt: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            keywords,
            image_url: image_url.into(),
            image_alt,
            status: EntryStatus::Pending,
            published_at: None,
            extra: Map::new(),
        }
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::Pending
    }

    pub fn published_at(&self) -> Option<NaiveDate> {
        self.published_at
    }

    /// Alt text for the cover image, falling back to the title.
    pub fn alt_text(&self) -> &str {
        self.image_alt
            .as_deref()
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .unwrap_or(&self.title)
    }

    /// `pending -> published`. Returns false for an entry that is already published.
    pub fn mark_published(&mut self, on: NaiveDate) -> bool {
        if self.status == EntryStatus::Published {
            return false;
        }
        self.status = EntryStatus::Published;
        self.published_at = Some(on);
        true
    }
}
