//! Value types returned by the AniList client.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::anilist::AniListError;

/// Media kind selector for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    Anime,
    Manga,
}

impl MediaKind {
    /// AniList GraphQL `MediaType` enum value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anime => "ANIME",
            Self::Manga => "MANGA",
        }
    }

    /// Path segment used in anilist.co detail URLs.
    pub fn url_segment(self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }
}

impl FromStr for MediaKind {
    type Err = AniListError;

    /// Accepts exactly `ANIME` or `MANGA`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANIME" => Ok(Self::Anime),
            "MANGA" => Ok(Self::Manga),
            other => Err(AniListError::InvalidMediaType(other.to_string())),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical anilist.co detail page for a media entry.
pub fn media_url(kind: MediaKind, id: u64) -> String {
    format!("https://anilist.co/{}/{id}", kind.url_segment())
}

/// A matched media entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnilistItem {
    pub id: u64,
    pub url: String,
    /// Average score on a 0-100 scale.
    pub score: Option<u32>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    /// English title, falling back to romaji.
    pub title: Option<String>,
    pub cover_url: Option<String>,
}

/// One entry of a user's anime or manga list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub user_name: String,
    pub media_id: u64,
    pub media_kind: MediaKind,
    pub title: String,
    pub url: String,
    pub cover_url: Option<String>,
    pub status: String,
    pub updated_at: Option<DateTime<Utc>>,
    /// Entry score on a 0-100 scale.
    pub score: Option<u32>,
    pub progress: Option<u32>,
    /// Manga only.
    pub progress_volumes: Option<u32>,
    /// Anime only.
    pub total_episodes: Option<u32>,
    /// Manga only.
    pub total_volumes: Option<u32>,
    /// Manga only.
    pub total_chapters: Option<u32>,
}

/// The owner of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub id: u64,
    pub name: String,
}
