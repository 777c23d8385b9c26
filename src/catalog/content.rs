//! Learning-content items as served by the `/api/tbooke-learning` feed.
//!
//! Field names mirror the wire format. Items are immutable once fetched;
//! the feed is replaced wholesale on every re-fetch.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ResolvedConfig;
use crate::session::InstitutionDetails;

/// A single piece of learning material
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(rename = "content_title", default)]
    pub title: Option<String>,

    /// HTML-bearing body text
    #[serde(rename = "content", default)]
    pub body: Option<String>,

    /// Storage reference for the thumbnail image
    #[serde(rename = "content_thumbnail", default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub visits: Option<u64>,

    /// Comma-separated category names
    #[serde(rename = "content_category", default)]
    pub category: Option<String>,

    /// Topic identifier; the server sends either a number or a string
    #[serde(default, deserialize_with = "de_topic_id")]
    pub topic_id: Option<String>,

    #[serde(rename = "user", default)]
    pub author: Option<ContentAuthor>,
}

impl ContentItem {
    /// Create a bare item (the builder methods fill in the rest)
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the comma-separated category string
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the topic identifier
    pub fn with_topic(mut self, topic_id: impl Into<String>) -> Self {
        self.topic_id = Some(topic_id.into());
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: ContentAuthor) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the HTML body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The item's categories: comma-split, trimmed, empty tokens dropped
    pub fn categories(&self) -> Vec<String> {
        self.category
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect()
    }

    /// Title with a display fallback
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "Untitled Content",
        }
    }

    /// Author display name: institution name for institutional authors,
    /// otherwise "first surname"
    pub fn author_name(&self) -> String {
        let Some(author) = &self.author else {
            return "Unknown Author".to_string();
        };
        author.display_name()
    }

    /// Plain-text excerpt of the body, HTML stripped, at most `max` chars
    pub fn excerpt(&self, max: usize) -> Option<String> {
        let cleaned = strip_html(self.body.as_deref().unwrap_or(""));
        if cleaned.is_empty() {
            return None;
        }

        if cleaned.chars().count() <= max {
            Some(cleaned)
        } else {
            let truncated: String = cleaned.chars().take(max).collect();
            Some(format!("{}..", truncated))
        }
    }

    /// Visit count, absent treated as zero
    pub fn visit_count(&self) -> u64 {
        self.visits.unwrap_or(0)
    }

    /// Creation timestamp, if the server sent a parseable one
    pub fn created(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        // Plain "YYYY-MM-DD HH:MM:SS" timestamps
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Creation date formatted for display ("May 1, 2024"), or "Unknown"
    pub fn format_date(&self) -> String {
        match self.created() {
            Some(dt) => dt.format("%B %-d, %Y").to_string(),
            None => "Unknown".to_string(),
        }
    }

    /// Full thumbnail URL resolved against the server's storage root
    pub fn thumbnail_url(&self, config: &ResolvedConfig) -> Option<String> {
        match self.thumbnail.as_deref() {
            Some(t) if !t.is_empty() => Some(config.storage_url(t)),
            _ => None,
        }
    }
}

/// Author of a content item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentAuthor {
    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub surname: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub profile_type: Option<String>,

    #[serde(default)]
    pub profile_picture: Option<String>,

    #[serde(rename = "institutionDetails", default)]
    pub institution_details: Option<InstitutionDetails>,
}

impl ContentAuthor {
    /// Create an individual author
    pub fn individual(first_name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            surname: Some(surname.into()),
            ..Default::default()
        }
    }

    /// Create an institutional author
    pub fn institution(name: impl Into<String>) -> Self {
        Self {
            profile_type: Some(crate::session::PROFILE_TYPE_INSTITUTION.to_string()),
            institution_details: Some(InstitutionDetails {
                institution_name: Some(name.into()),
            }),
            ..Default::default()
        }
    }

    /// Display name with fallbacks for sparse records
    pub fn display_name(&self) -> String {
        if self.profile_type.as_deref() == Some(crate::session::PROFILE_TYPE_INSTITUTION) {
            return self
                .institution_details
                .as_ref()
                .and_then(|d| d.institution_name.clone())
                .unwrap_or_else(|| "Institution Name Unavailable".to_string());
        }

        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.surname.as_deref().unwrap_or("")
        );
        let name = name.trim();

        if name.is_empty() {
            "Unknown Author".to_string()
        } else {
            name.to_string()
        }
    }
}

/// Accept a topic id sent as either a JSON number or a string
fn de_topic_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Strip HTML tags and `&nbsp;` entities, returning trimmed plain text
fn strip_html(text: &str) -> String {
    let text = text.replace("&nbsp;", " ");

    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_split_and_trim() {
        let item = ContentItem::new(1, "Test").with_category(" Math , Science,, Physics ");
        assert_eq!(item.categories(), vec!["Math", "Science", "Physics"]);

        let bare = ContentItem::new(2, "Bare");
        assert!(bare.categories().is_empty());
    }

    #[test]
    fn test_topic_id_number_or_string() {
        let from_number: ContentItem =
            serde_json::from_str(r#"{ "id": 1, "topic_id": 7 }"#).unwrap();
        assert_eq!(from_number.topic_id, Some("7".to_string()));

        let from_string: ContentItem =
            serde_json::from_str(r#"{ "id": 2, "topic_id": "12" }"#).unwrap();
        assert_eq!(from_string.topic_id, Some("12".to_string()));

        let from_null: ContentItem =
            serde_json::from_str(r#"{ "id": 3, "topic_id": null }"#).unwrap();
        assert_eq!(from_null.topic_id, None);
    }

    #[test]
    fn test_wire_field_names() {
        let item: ContentItem = serde_json::from_str(
            r#"{
                "id": 9,
                "slug": "intro-to-ai",
                "content_title": "Introduction to AI",
                "content": "<p>Learn&nbsp;things</p>",
                "content_category": "Tech, AI",
                "visits": 42,
                "user": { "first_name": "Grace", "surname": "Wanjiru" }
            }"#,
        )
        .unwrap();

        assert_eq!(item.display_title(), "Introduction to AI");
        assert_eq!(item.categories(), vec!["Tech", "AI"]);
        assert_eq!(item.visit_count(), 42);
        assert_eq!(item.author_name(), "Grace Wanjiru");
    }

    #[test]
    fn test_excerpt_strips_html() {
        let item = ContentItem::new(1, "T")
            .with_body("<p>Hello&nbsp;<strong>world</strong>, welcome aboard</p>");

        assert_eq!(
            item.excerpt(100),
            Some("Hello world, welcome aboard".to_string())
        );
        assert_eq!(item.excerpt(5), Some("Hello..".to_string()));

        let empty = ContentItem::new(2, "T").with_body("<br/>");
        assert_eq!(empty.excerpt(100), None);
    }

    #[test]
    fn test_author_display_rules() {
        let institution =
            ContentItem::new(1, "T").with_author(ContentAuthor::institution("Hilltop Academy"));
        assert_eq!(institution.author_name(), "Hilltop Academy");

        let person =
            ContentItem::new(2, "T").with_author(ContentAuthor::individual("Grace", "Wanjiru"));
        assert_eq!(person.author_name(), "Grace Wanjiru");

        let nameless = ContentItem::new(3, "T").with_author(ContentAuthor::default());
        assert_eq!(nameless.author_name(), "Unknown Author");

        let no_author = ContentItem::new(4, "T");
        assert_eq!(no_author.author_name(), "Unknown Author");
    }

    #[test]
    fn test_created_parses_both_formats() {
        let mut item = ContentItem::new(1, "T");

        item.created_at = Some("2024-05-01T10:30:00.000000Z".to_string());
        assert!(item.created().is_some());
        assert_eq!(item.format_date(), "May 1, 2024");

        item.created_at = Some("2024-05-01 10:30:00".to_string());
        assert!(item.created().is_some());

        item.created_at = Some("not a date".to_string());
        assert_eq!(item.format_date(), "Unknown");

        item.created_at = None;
        assert_eq!(item.format_date(), "Unknown");
    }
}
