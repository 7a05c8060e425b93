use thiserror::Error;

/// Errors from the AniList API client.
#[derive(Debug, Error)]
pub enum AniListError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid media type {0:?}: expected ANIME or MANGA")]
    InvalidMediaType(String),

    #[error("invalid season offset {0}: expected -1, 0 or 1")]
    InvalidOffset(i32),

    #[error("GraphQL error: {0}")]
    GraphQL(String),
}
