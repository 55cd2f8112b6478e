use serde::{Deserialize, Serialize};

/// Unparsed field spans of one `<item>` block. Missing fields are empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawFeedItem<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub pub_date: &'a str,
    pub description: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: Option<String>, // ISO-8601, UTC
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub ok: bool,
    pub source: String,
    pub query: String,
    pub window_hours: u32,
    pub generated_at: String,
    pub items: Vec<NewsItem>,
}
