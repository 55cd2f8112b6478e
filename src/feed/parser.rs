use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::feed::types::RawFeedItem;

// Feed markup is untrusted; every scan below is a plain text search so a
// broken document still yields whatever items can be recognized.
static ITEM_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<item\b.*?</item>").expect("valid item pattern"));

static TITLE: LazyLock<Regex> = LazyLock::new(|| field_pattern("title"));
static LINK: LazyLock<Regex> = LazyLock::new(|| field_pattern("link"));
static PUB_DATE: LazyLock<Regex> = LazyLock::new(|| field_pattern("pubDate"));
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| field_pattern("description"));
static SOURCE: LazyLock<Regex> = LazyLock::new(|| field_pattern("source"));

fn field_pattern(tag: &str) -> Regex {
    Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>")).expect("valid field pattern")
}

pub fn parse_feed(markup: &str) -> Vec<RawFeedItem<'_>> {
    let items: Vec<_> = ITEM_BLOCK
        .find_iter(markup)
        .map(|block| parse_item(block.as_str()))
        .collect();

    debug!("found {} item blocks in feed", items.len());
    items
}

pub fn parse_item(block: &str) -> RawFeedItem<'_> {
    RawFeedItem {
        title: text_of(block, &TITLE),
        link: text_of(block, &LINK),
        pub_date: text_of(block, &PUB_DATE),
        description: text_of(block, &DESCRIPTION),
        source: text_of(block, &SOURCE),
    }
}

/// Content of the first matching element, unwrapped from CDATA and trimmed.
fn text_of<'a>(block: &'a str, pattern: &Regex) -> &'a str {
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_cdata(m.as_str()))
        .unwrap_or_default()
}

pub fn strip_cdata(content: &str) -> &str {
    let mut text = content.trim();

    if text
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<![CDATA["))
    {
        text = &text[9..];
    }
    if let Some(stripped) = text.strip_suffix("]]>") {
        text = stripped;
    }

    text.trim()
}
