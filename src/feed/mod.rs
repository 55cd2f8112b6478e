pub mod normalize;
pub mod parser;
pub mod types;

pub use normalize::normalize_items;
pub use parser::parse_feed;
pub use types::{FeedResponse, NewsItem, RawFeedItem};

/// Parses raw feed markup into at most `limit` normalized items, newest first.
pub fn parse_items(markup: &str, limit: usize) -> Vec<NewsItem> {
    normalize_items(parse_feed(markup), limit)
}
