use crate::shopify::CommerceApi;
use crate::shopify::articles::TITLE_WINDOW;
use rand::seq::IteratorRandom;
use std::collections::HashSet;
use tracing::{info, warn};

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Normalized titles of recently published articles. Lookup failures degrade to an empty set.
pub async fn existing_titles(api: &dyn CommerceApi, blog_id: &str) -> HashSet<String> {
    match api.recent_article_titles(blog_id, TITLE_WINDOW).await {
        Ok(titles) => {
            let set: HashSet<String> = titles
                .iter()
                .map(|title| normalize_title(title))
                .filter(|title| !title.is_empty())
                .collect();
            info!(target = "blog.planner", existing = set.len(), "existing_titles_loaded");
            set
        }
        Err(err) => {
            warn!(target = "blog.planner", error = %err, "existing_titles_unavailable");
            HashSet::new()
        }
    }
}

/// Arbitrary subset of at most `limit` titles for the prompt's exclusion list.
pub fn exclusion_sample(titles: &HashSet<String>, limit: usize) -> Vec<String> {
    titles
        .iter()
        .cloned()
        .choose_multiple(&mut rand::rng(), limit)
}
