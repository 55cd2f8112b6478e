use url::Url;

use crate::request::{FeedRequest, Language};

/// Locale parameters sent to the news search for one supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleProfile {
    pub hl: &'static str,
    pub gl: &'static str,
    pub ceid: &'static str,
}

pub const GERMAN: LocaleProfile = LocaleProfile {
    hl: "de",
    gl: "DE",
    ceid: "DE:de",
};

pub const US_ENGLISH: LocaleProfile = LocaleProfile {
    hl: "en-US",
    gl: "US",
    ceid: "US:en",
};

impl Language {
    pub fn profile(self) -> &'static LocaleProfile {
        match self {
            Language::De => &GERMAN,
            Language::En => &US_ENGLISH,
        }
    }
}

/// Search text with the freshness operator appended, e.g. `Tarkov when:72h`.
pub fn search_text(request: &FeedRequest) -> String {
    format!("{} when:{}h", request.query, request.window_hours)
}

pub fn build_upstream_url(base: &str, request: &FeedRequest) -> Result<Url, url::ParseError> {
    let profile = request.language.profile();
    let mut url = Url::parse(base)?;

    url.query_pairs_mut()
        .clear()
        .append_pair("q", &search_text(request))
        .append_pair("hl", profile.hl)
        .append_pair("gl", profile.gl)
        .append_pair("ceid", profile.ceid);

    Ok(url)
}
