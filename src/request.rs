use std::ops::RangeInclusive;

use tracing::debug;

use crate::config::DEFAULT_QUERY;

pub const HOURS_RANGE: RangeInclusive<i64> = 1..=168;
pub const LIMIT_RANGE: RangeInclusive<i64> = 1..=30;
pub const DEFAULT_HOURS: i64 = 72;
pub const DEFAULT_LIMIT: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    /// Only an explicit `en` selects English; anything else is German.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("en") => Language::En,
            _ => Language::De,
        }
    }
}

/// Canonical, already clamped description of what the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub language: Language,
    pub window_hours: u32,
    pub limit: usize,
    pub query: String,
}

impl Default for FeedRequest {
    fn default() -> Self {
        Self::from_query(None)
    }
}

impl FeedRequest {
    pub fn from_query(raw: Option<&str>) -> Self {
        Self::from_query_with_default(raw, DEFAULT_QUERY)
    }

    /// Normalizes a raw query string. Never fails: malformed or out of range
    /// values fall back to defaults or are clamped.
    pub fn from_query_with_default(raw: Option<&str>, default_query: &str) -> Self {
        let params = QueryParams::parse(raw.unwrap_or_default());

        let window_hours = clamp_param(params.get("hours"), DEFAULT_HOURS, HOURS_RANGE);
        let limit = clamp_param(params.get("limit"), DEFAULT_LIMIT, LIMIT_RANGE);

        let request = Self {
            language: Language::from_param(params.get("lang")),
            window_hours: window_hours as u32,
            limit: limit as usize,
            query: params
                .get("q")
                .map(str::to_string)
                .unwrap_or_else(|| default_query.to_string()),
        };

        debug!("normalized request: {:?}", request);
        request
    }
}

/// Decoded query pairs. Empty values count as absent.
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(raw: &str) -> Self {
        Self(
            url::form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// First occurrence wins.
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

fn clamp_param(value: Option<&str>, default: i64, range: RangeInclusive<i64>) -> i64 {
    let Some(value) = value else {
        return default;
    };

    match parse_leading_int(value) {
        Some(n) => n.clamp(*range.start(), *range.end()),
        None => *range.start(),
    }
}

/// Reads an optionally signed integer prefix, ignoring leading whitespace and
/// any trailing characters (`"12abc"` is 12). Overflow saturates.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = &digits[..digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len())];

    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });

    Some(if negative { -magnitude } else { magnitude })
}
