use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use tracing::debug;

use crate::feed::types::{NewsItem, RawFeedItem};

pub const EXCERPT_MAX_CHARS: usize = 180;
pub const UNTITLED: &str = "(untitled)";
const ELLIPSIS: char = '…';

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

const ENTITIES: [(&str, char); 6] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
];

/// Normalizes raw items, sorts them newest first and keeps the first `limit`.
pub fn normalize_items(raw: Vec<RawFeedItem<'_>>, limit: usize) -> Vec<NewsItem> {
    let total = raw.len();
    let mut items: Vec<NewsItem> = raw.into_iter().map(normalize_item).collect();

    // Stable, so equal timestamps keep feed order. Missing dates compare as ""
    // and end up last.
    items.sort_by(|a, b| {
        let a = a.published_at.as_deref().unwrap_or_default();
        let b = b.published_at.as_deref().unwrap_or_default();
        b.cmp(a)
    });
    items.truncate(limit);

    debug!("normalized {} of {} feed items", items.len(), total);
    items
}

pub fn normalize_item(raw: RawFeedItem<'_>) -> NewsItem {
    let title = decode_entities(raw.title);
    let description = decode_entities(raw.description);

    NewsItem {
        title: if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title
        },
        url: decode_entities(raw.link),
        source: decode_entities(raw.source),
        published_at: parse_pub_date(&decode_entities(raw.pub_date)),
        excerpt: truncate(
            &collapse_whitespace(&strip_tags(&description)),
            EXCERPT_MAX_CHARS,
        ),
    }
}

/// Decodes the handful of entities feeds commonly escape. Single pass, so
/// `&amp;lt;` becomes `&lt;` and not `<`.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, decoded)) => {
                out.push(*decoded);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Cuts to `max` characters, ending in an ellipsis when anything was removed.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    let mut truncated = kept.trim_end().to_string();
    truncated.push(ELLIPSIS);
    truncated
}

/// Parses a feed date into `YYYY-MM-DDTHH:MM:SS.mmmZ`; anything unreadable is
/// `None`.
pub fn parse_pub_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_naive(raw));

    match parsed {
        Some(dt) => Some(to_iso(dt)),
        None => {
            debug!("unparseable feed date: {:?}", raw);
            None
        }
    }
}

/// Zone-less timestamps are read as UTC.
fn parse_naive(raw: &str) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
