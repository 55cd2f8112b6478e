use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream feed responded with status {0}")]
    Status(u16),

    #[error("Error requesting upstream feed")]
    Transport(#[from] reqwest::Error),

    #[error("Error building upstream feed URL")]
    Url(#[from] url::ParseError),

    #[error("Invalid upstream request header")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl UpstreamError {
    /// The upstream HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status(status) => Some(*status),
            UpstreamError::Transport(err) => err.status().map(|s| s.as_u16()),
            UpstreamError::Url(_) | UpstreamError::Header(_) => None,
        }
    }
}
