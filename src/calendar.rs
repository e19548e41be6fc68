use crate::models::ContentEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("calendar at {path} is not valid: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("calendar could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Blog key to entries, in insertion (and publish) order.
///
/// Blog keys are written back sorted; entry order within a blog is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentCalendar {
    blogs: BTreeMap<String, Vec<ContentEntry>>,
}

impl ContentCalendar {
    pub fn entries(&self, blog_key: &str) -> &[ContentEntry] {
        self.blogs.get(blog_key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn blog_keys(&self) -> impl Iterator<Item = &str> {
        self.blogs.keys().map(String::as_str)
    }

    pub fn ensure_blog(&mut self, blog_key: &str) {
        self.blogs.entry(blog_key.to_string()).or_default();
    }

    pub fn append(&mut self, blog_key: &str, entry: ContentEntry) {
        self.blogs
            .entry(blog_key.to_string())
            .or_default()
            .push(entry);
    }

    /// Index of the oldest pending entry.
    pub fn next_pending(&self, blog_key: &str) -> Option<usize> {
        self.entries(blog_key)
            .iter()
            .position(ContentEntry::is_pending)
    }

    pub fn entry_mut(&mut self, blog_key: &str, index: usize) -> Option<&mut ContentEntry> {
        self.blogs.get_mut(blog_key)?.get_mut(index)
    }

    pub fn pending_count(&self, blog_key: &str) -> usize {
        self.entries(blog_key)
            .iter()
            .filter(|entry| entry.is_pending())
            .count()
    }
}

/// Whole-document JSON persistence.
#[derive(Debug, Clone)]
pub struct CalendarStore {
    path: PathBuf,
}

impl CalendarStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// A missing file is an empty calendar.
    pub fn load(&self) -> Result<ContentCalendar, CalendarError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(target = "blog.calendar", path = %self.path.display(), "calendar_missing");
                return Ok(ContentCalendar::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&raw).map_err(|source| CalendarError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrites the whole document through a temp file renamed over the target.
    pub fn save(&self, calendar: &ContentCalendar) -> Result<(), CalendarError> {
        let mut encoded = serde_json::to_string_pretty(calendar)?;
        encoded.push('\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        // The temp file is created owner-only; carry over the target's mode instead.
        if let Ok(existing) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|source| self.io_error(source))?;
        }
        tmp.write_all(encoded.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        debug!(target = "blog.calendar", path = %self.path.display(), bytes = encoded.len(), "calendar_saved");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> CalendarError {
        CalendarError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
