pub mod client;
pub mod error;
pub mod mock;
pub mod query;

pub use client::{FeedSource, HttpFeedSource};
pub use error::UpstreamError;
pub use query::{build_upstream_url, LocaleProfile};
