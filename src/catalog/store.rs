//! The content catalog: raw feed, derived facets, and the filtered view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::api::TbookeApi;

use super::content::ContentItem;
use super::facets::{derive_facets, Facet, Facets};
use super::filter::{FilterState, SearchDebouncer};

/// Fetch status of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStatus {
    /// Nothing fetched yet (or no session)
    Idle,

    /// A fetch is in flight
    Loading,

    /// The cached list reflects the last successful fetch
    Ready,

    /// The last fetch failed; the cached list is empty
    Failed,
}

/// Searchable, facetable view over the learning-content feed
pub struct ContentCatalog {
    api: Arc<dyn TbookeApi>,
    status: CatalogStatus,
    items: Vec<ContentItem>,
    facets: Facets,
    filter: FilterState,
    search: SearchDebouncer,
}

impl ContentCatalog {
    /// Create an empty catalog
    pub fn new(api: Arc<dyn TbookeApi>) -> Self {
        Self {
            api,
            status: CatalogStatus::Idle,
            items: Vec::new(),
            facets: Facets::default(),
            filter: FilterState::default(),
            search: SearchDebouncer::default(),
        }
    }

    pub fn status(&self) -> CatalogStatus {
        self.status
    }

    /// The full cached list, fetch order
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Category facets derived from the full list
    pub fn available_categories(&self) -> &[Facet] {
        &self.facets.categories
    }

    /// Topic facets derived from the full list
    pub fn available_topics(&self) -> &[Facet] {
        &self.facets.topics
    }

    /// Current filter state
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Fetch the feed and replace the cached list wholesale.
    ///
    /// Without a token the list is emptied and nothing is fetched. On any
    /// fetch error the list and facets are cleared; the next successful
    /// fetch fully repopulates them.
    pub async fn fetch_all(&mut self, token: Option<&str>) {
        let Some(token) = token else {
            debug!("No session token, clearing content list");
            self.items.clear();
            self.facets = Facets::default();
            self.status = CatalogStatus::Idle;
            return;
        };

        self.status = CatalogStatus::Loading;

        match self.api.fetch_contents(token).await {
            Ok(items) => {
                self.facets = derive_facets(&items);
                self.items = items;
                self.status = CatalogStatus::Ready;
            }
            Err(e) => {
                error!("Failed to fetch learning contents: {}", e);
                self.items.clear();
                self.facets = Facets::default();
                self.status = CatalogStatus::Failed;
            }
        }
    }

    /// Buffer a search edit; it takes effect after the quiet period
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search.submit(text);
    }

    /// Apply a search edit immediately, dropping any buffered one
    pub fn search_now(&mut self, text: impl Into<String>) {
        self.search.cancel();
        self.filter.search_text = text.into();
    }

    /// Apply the buffered search edit if its quiet period has elapsed.
    /// Returns true when the filter changed.
    pub fn apply_pending_search(&mut self) -> bool {
        if let Some(text) = self.search.poll() {
            self.filter.search_text = text;
            true
        } else {
            false
        }
    }

    /// Wait out the quiet period and apply the buffered search edit
    pub async fn settle_search(&mut self) {
        if let Some(text) = self.search.settle().await {
            self.filter.search_text = text;
        }
    }

    pub fn toggle_category(&mut self, name: &str) {
        self.filter.toggle_category(name);
    }

    pub fn toggle_topic(&mut self, id: &str) {
        self.filter.toggle_topic(id);
    }

    /// Reset search and selections. Facets are derived from the cached
    /// list and persist across a clear.
    pub fn clear_filters(&mut self) {
        self.search.cancel();
        self.filter.clear();
    }

    /// The filtered view: stages applied in sequence, fetch order
    /// preserved. Safe to call in any status; operates on whatever list
    /// is cached.
    pub fn filtered(&self) -> Vec<&ContentItem> {
        self.items
            .iter()
            .filter(|item| self.filter.matches(item))
            .collect()
    }
}
