use thiserror::Error;
use tsuiseki_api::AniListError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    AniList(#[from] AniListError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("`{0}` needs an access token: set anilist.access_token or pass --token")]
    MissingToken(&'static str),
}
