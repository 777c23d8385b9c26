//! Facet derivation from the raw content list.
//!
//! Facets are always derived from the full unfiltered list, never from a
//! filtered subset, so selecting a filter cannot shrink the facet menu.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::content::ContentItem;

/// A distinct filterable value derived from the content list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    /// Value matched against item fields
    pub id: String,

    /// Display label
    pub name: String,
}

impl Facet {
    /// Category facet: label equals the value
    pub fn category(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
        }
    }

    /// Topic facet: labeled "Topic <id>"
    pub fn topic(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: format!("Topic {}", id),
            id,
        }
    }
}

/// Derived facet sets
#[derive(Debug, Clone, Default)]
pub struct Facets {
    /// Distinct categories, first-seen order
    pub categories: Vec<Facet>,

    /// Distinct topics, first-seen order
    pub topics: Vec<Facet>,
}

/// Walk every item and accumulate the distinct categories and topics.
///
/// Duplicates collapse, order is first-seen, and missing or empty fields
/// never produce empty-string facets.
pub fn derive_facets(items: &[ContentItem]) -> Facets {
    let mut facets = Facets::default();
    let mut seen_categories: HashSet<String> = HashSet::new();
    let mut seen_topics: HashSet<String> = HashSet::new();

    for item in items {
        for category in item.categories() {
            if seen_categories.insert(category.clone()) {
                facets.categories.push(Facet::category(category));
            }
        }

        if let Some(topic_id) = &item.topic_id {
            if !topic_id.is_empty() && seen_topics.insert(topic_id.clone()) {
                facets.topics.push(Facet::topic(topic_id.clone()));
            }
        }
    }

    facets
}
