//! Filter state and the search debouncer.
//!
//! Filtering is staged: search text, then categories, then topics. AND
//! across stages, OR within a stage. Unknown facet values match nothing.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::content::ContentItem;

/// Quiet period before a search edit is applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// User-entered filter state
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Free-text search over title and author names
    pub search_text: String,

    /// Selected category facet values
    pub selected_categories: HashSet<String>,

    /// Selected topic facet values
    pub selected_topics: HashSet<String>,
}

impl FilterState {
    /// True when no filter is active
    pub fn is_empty(&self) -> bool {
        self.search_text.trim().is_empty()
            && self.selected_categories.is_empty()
            && self.selected_topics.is_empty()
    }

    /// Add the category if absent, remove it if present
    pub fn toggle_category(&mut self, name: &str) {
        if !self.selected_categories.remove(name) {
            self.selected_categories.insert(name.to_string());
        }
    }

    /// Add the topic if absent, remove it if present
    pub fn toggle_topic(&mut self, id: &str) {
        if !self.selected_topics.remove(id) {
            self.selected_topics.insert(id.to_string());
        }
    }

    /// Reset every filter field
    pub fn clear(&mut self) {
        self.search_text.clear();
        self.selected_categories.clear();
        self.selected_topics.clear();
    }

    /// Whether an item passes every active filter stage
    pub fn matches(&self, item: &ContentItem) -> bool {
        let query = self.search_text.trim().to_lowercase();
        if !query.is_empty() {
            let title = item.title.as_deref().unwrap_or("").to_lowercase();
            let (first_name, surname) = match &item.author {
                Some(author) => (
                    author.first_name.as_deref().unwrap_or("").to_lowercase(),
                    author.surname.as_deref().unwrap_or("").to_lowercase(),
                ),
                None => (String::new(), String::new()),
            };

            if !title.contains(&query)
                && !first_name.contains(&query)
                && !surname.contains(&query)
            {
                return false;
            }
        }

        if !self.selected_categories.is_empty() {
            let categories = item.categories();
            if !categories
                .iter()
                .any(|c| self.selected_categories.contains(c))
            {
                return false;
            }
        }

        if !self.selected_topics.is_empty() {
            match &item.topic_id {
                Some(topic) if self.selected_topics.contains(topic) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Coalesces rapid search edits: a pending deadline plus a
/// latest-value-wins buffer. Each submission resets the deadline; the
/// value is released once the quiet period has elapsed.
#[derive(Debug)]
pub struct SearchDebouncer {
    quiet_period: Duration,
    pending: Option<PendingSearch>,
}

#[derive(Debug, Clone)]
struct PendingSearch {
    value: String,
    deadline: Instant,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    /// Create a debouncer with a custom quiet period
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    /// Buffer a new value and reset the quiet-period deadline
    pub fn submit(&mut self, value: impl Into<String>) {
        self.submit_at(value, Instant::now());
    }

    /// Buffer a new value against an explicit clock reading
    pub fn submit_at(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(PendingSearch {
            value: value.into(),
            deadline: now + self.quiet_period,
        });
    }

    /// Release the buffered value if its quiet period has elapsed
    pub fn poll(&mut self) -> Option<String> {
        self.poll_at(Instant::now())
    }

    /// Release against an explicit clock reading
    pub fn poll_at(&mut self, now: Instant) -> Option<String> {
        if let Some(pending) = &self.pending {
            if now >= pending.deadline {
                return self.pending.take().map(|p| p.value);
            }
        }
        None
    }

    /// Wait out the remaining quiet period and release the buffered value
    pub async fn settle(&mut self) -> Option<String> {
        let deadline = self.pending.as_ref()?.deadline;
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        self.pending.take().map(|p| p.value)
    }

    /// Whether a value is waiting for its quiet period
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any buffered value
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
