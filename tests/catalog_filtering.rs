//! Catalog Filtering Integration Tests
//!
//! Covers facet derivation, the staged filter pipeline, fail-safe fetch
//! behavior, and the status machine around `fetch_all`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tbooke::api::{ApiError, TbookeApi};
use tbooke::catalog::{CatalogStatus, ContentAuthor, ContentCatalog, ContentItem};
use tbooke::session::Profile;

/// API stub replaying a scripted sequence of feed results
struct ScriptedApi {
    responses: Mutex<VecDeque<Result<Vec<ContentItem>, ApiError>>>,
}

impl ScriptedApi {
    fn new(responses: Vec<Result<Vec<ContentItem>, ApiError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl TbookeApi for ScriptedApi {
    async fn login(&self, _email: &str, _password: &str) -> Result<String, ApiError> {
        Err(ApiError::Network)
    }

    async fn fetch_profile(&self, _token: &str) -> Result<Profile, ApiError> {
        Err(ApiError::Network)
    }

    async fn fetch_contents(&self, _token: &str) -> Result<Vec<ContentItem>, ApiError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn sample_feed() -> Vec<ContentItem> {
    vec![
        ContentItem::new(1, "Introduction to AI")
            .with_category("Tech")
            .with_author(ContentAuthor::individual("Grace", "Wanjiru")),
        ContentItem::new(2, "Algebra Basics")
            .with_category("Math,Physics")
            .with_topic("7"),
        ContentItem::new(3, "Cell Biology")
            .with_category("Biology")
            .with_topic("12"),
    ]
}

async fn ready_catalog(feed: Vec<ContentItem>) -> ContentCatalog {
    let api: Arc<dyn TbookeApi> = ScriptedApi::new(vec![Ok(feed)]);
    let mut catalog = ContentCatalog::new(api);
    catalog.fetch_all(Some("tok")).await;
    catalog
}

#[tokio::test]
async fn test_facets_collapse_duplicates() {
    let catalog = ready_catalog(vec![
        ContentItem::new(1, "A").with_category("Math, Science"),
        ContentItem::new(2, "B").with_category("Science"),
        ContentItem::new(3, "C").with_category("Math"),
    ])
    .await;

    let names: Vec<&str> = catalog
        .available_categories()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["Math", "Science"]);
}

#[tokio::test]
async fn test_search_filters_by_title() {
    let mut catalog = ready_catalog(sample_feed()).await;

    catalog.search_now("ai");

    let titles: Vec<&str> = catalog
        .filtered()
        .iter()
        .map(|i| i.display_title())
        .collect();
    assert_eq!(titles, vec!["Introduction to AI"]);
}

#[tokio::test]
async fn test_category_filter_or_semantics() {
    let mut catalog = ready_catalog(vec![
        ContentItem::new(1, "A").with_category("Math,Physics"),
        ContentItem::new(2, "B").with_category("Biology"),
    ])
    .await;

    catalog.toggle_category("Math");

    let ids: Vec<i64> = catalog.filtered().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_topic_filter() {
    let mut catalog = ready_catalog(sample_feed()).await;

    catalog.toggle_topic("12");

    let ids: Vec<i64> = catalog.filtered().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn test_combined_stages_are_anded() {
    let mut catalog = ready_catalog(sample_feed()).await;

    catalog.toggle_category("Math");
    catalog.toggle_topic("7");
    assert_eq!(catalog.filtered().len(), 1);

    // Adding a search term that misses the remaining item empties the view
    catalog.search_now("biology");
    assert!(catalog.filtered().is_empty());
}

#[tokio::test]
async fn test_clear_filters_restores_list_and_keeps_facets() {
    let mut catalog = ready_catalog(sample_feed()).await;

    catalog.search_now("ai");
    catalog.toggle_category("Math");
    catalog.toggle_topic("7");
    assert!(catalog.filtered().len() < 3);

    let categories_before = catalog.available_categories().to_vec();
    let topics_before = catalog.available_topics().to_vec();

    catalog.clear_filters();

    assert_eq!(catalog.filtered().len(), 3);
    assert_eq!(catalog.available_categories(), &categories_before[..]);
    assert_eq!(catalog.available_topics(), &topics_before[..]);
}

#[tokio::test]
async fn test_fetch_failure_then_recovery() {
    let api: Arc<dyn TbookeApi> =
        ScriptedApi::new(vec![Err(ApiError::Server(500)), Ok(sample_feed())]);
    let mut catalog = ContentCatalog::new(api);

    catalog.fetch_all(Some("tok")).await;
    assert_eq!(catalog.status(), CatalogStatus::Failed);
    assert!(catalog.items().is_empty());
    assert!(catalog.available_categories().is_empty());
    assert!(catalog.available_topics().is_empty());

    // Failed accepts a new fetch and fully repopulates
    catalog.fetch_all(Some("tok")).await;
    assert_eq!(catalog.status(), CatalogStatus::Ready);
    assert_eq!(catalog.items().len(), 3);
    assert!(!catalog.available_categories().is_empty());
}

#[tokio::test]
async fn test_fetch_without_token_is_idle_and_empty() {
    let api: Arc<dyn TbookeApi> = ScriptedApi::new(vec![Ok(sample_feed())]);
    let mut catalog = ContentCatalog::new(api);

    catalog.fetch_all(None).await;

    assert_eq!(catalog.status(), CatalogStatus::Idle);
    assert!(catalog.items().is_empty());
    assert!(catalog.filtered().is_empty());
}

#[tokio::test]
async fn test_filtering_before_any_fetch_is_safe() {
    let api: Arc<dyn TbookeApi> = ScriptedApi::new(vec![]);
    let mut catalog = ContentCatalog::new(api);

    catalog.search_now("anything");
    catalog.toggle_category("Math");

    assert_eq!(catalog.status(), CatalogStatus::Idle);
    assert!(catalog.filtered().is_empty());
}

#[tokio::test]
async fn test_refetch_replaces_list_wholesale() {
    let api: Arc<dyn TbookeApi> = ScriptedApi::new(vec![
        Ok(sample_feed()),
        Ok(vec![ContentItem::new(9, "Fresh Item").with_category("News")]),
    ]);
    let mut catalog = ContentCatalog::new(api);

    catalog.fetch_all(Some("tok")).await;
    assert_eq!(catalog.items().len(), 3);

    catalog.fetch_all(Some("tok")).await;
    assert_eq!(catalog.items().len(), 1);

    let names: Vec<&str> = catalog
        .available_categories()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["News"]);
}
