use std::{str::FromStr, time::Duration};

use http::HeaderValue;
use thiserror::Error;

use crate::http::response::HeaderProfile;

pub const DEFAULT_UPSTREAM_URL: &str = "https://news.google.com/rss/search";
pub const DEFAULT_USER_AGENT: &str = "gearcollector.de (+https://gearcollector.de)";
pub const DEFAULT_ACCEPT: &str = "application/rss+xml, application/xml;q=0.9, */*;q=0.8";
pub const DEFAULT_QUERY: &str = r#""Escape from Tarkov" OR Tarkov OR Battlestate"#;
pub const SOURCE_LABEL: &str = "google-news-rss";

const DEFAULT_CACHE_MAX_AGE: u64 = 900; // 15 minutes
const DEFAULT_CACHE_CAPACITY: u64 = 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("NEWS_HEADER_PROFILE must be 'strict' or 'basic', got '{0}'")]
    InvalidProfile(String),

    #[error("{name} is not a valid header value, got '{value}'")]
    InvalidHeader { name: &'static str, value: String },

    #[error("NEWS_UPSTREAM_URL is not a valid URL")]
    InvalidUrl(#[from] url::ParseError),
}

/// Fixed settings for the news pipeline. Built once at startup and shared
/// read-only between requests.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub upstream_url: String,
    pub user_agent: String,
    pub accept: String,
    pub default_query: String,
    pub source_label: String,
    pub cache_max_age: u64, // seconds
    pub cache_capacity: u64,
    pub upstream_timeout: Option<Duration>,
    pub header_profile: HeaderProfile,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            default_query: DEFAULT_QUERY.to_string(),
            source_label: SOURCE_LABEL.to_string(),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            upstream_timeout: None,
            header_profile: HeaderProfile::Strict,
        }
    }
}

impl NewsConfig {
    /// Reads overrides from the environment (and `.env`), keeping defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(url) = env_value("NEWS_UPSTREAM_URL") {
            url::Url::parse(&url)?;
            config.upstream_url = url;
        }
        if let Some(agent) = env_header("NEWS_USER_AGENT")? {
            config.user_agent = agent;
        }
        if let Some(accept) = env_header("NEWS_ACCEPT")? {
            config.accept = accept;
        }
        if let Some(query) = env_value("NEWS_DEFAULT_QUERY") {
            config.default_query = query;
        }
        if let Some(max_age) = env_number("NEWS_CACHE_MAX_AGE")? {
            config.cache_max_age = max_age;
        }
        if let Some(capacity) = env_number("NEWS_CACHE_CAPACITY")? {
            config.cache_capacity = capacity;
        }
        if let Some(profile) = env_value("NEWS_HEADER_PROFILE") {
            config.header_profile = match profile.trim().to_ascii_lowercase().as_str() {
                "strict" => HeaderProfile::Strict,
                "basic" => HeaderProfile::Basic,
                _ => return Err(ConfigError::InvalidProfile(profile)),
            };
        }
        config.upstream_timeout = env_number("NEWS_UPSTREAM_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(config)
    }

    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    pub fn with_header_profile(mut self, profile: HeaderProfile) -> Self {
        self.header_profile = profile;
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Header values are checked here so a bad one stops startup instead of
/// reaching the client builder.
fn env_header(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env_value(name) {
        None => Ok(None),
        Some(value) if HeaderValue::from_str(&value).is_ok() => Ok(Some(value)),
        Some(value) => Err(ConfigError::InvalidHeader { name, value }),
    }
}

fn env_number<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env_value(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
