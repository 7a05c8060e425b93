use chrono::DateTime;
use serde::Deserialize;

use crate::models::{media_url, AnilistItem, MediaKind, Update, Viewer};

// ── GraphQL response wrappers ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

impl GraphQLError {
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

// ── Media queries ────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MediaResponse {
    #[serde(rename = "Media")]
    pub media: Option<AniListMedia>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AniListMedia {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub title: Option<AniListTitle>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    #[serde(rename = "averageScore")]
    pub average_score: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CoverImage {
    #[serde(rename = "extraLarge")]
    pub extra_large: Option<String>,
}

// ── User / following queries ─────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UserResponse {
    #[serde(rename = "User")]
    pub user: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct UserId {
    pub id: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowingPageResponse {
    #[serde(rename = "Page")]
    pub page: Option<FollowingPage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowingPage {
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
    pub users: Option<Vec<FollowedUser>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage", default)]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct FollowedUser {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerResponse {
    #[serde(rename = "Viewer")]
    pub viewer: Option<ViewerNode>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerNode {
    pub id: u64,
    pub name: String,
}

// ── List queries ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MediaListResponse {
    #[serde(rename = "MediaList")]
    pub media_list: Option<MediaListProgress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaListProgress {
    pub progress: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaListCollectionResponse {
    #[serde(rename = "MediaListCollection")]
    pub media_list_collection: Option<MediaListCollection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaListCollection {
    pub lists: Option<Vec<MediaListGroup>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaListGroup {
    pub entries: Option<Vec<MediaListEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListEntry {
    #[serde(rename = "mediaId")]
    pub media_id: u64,
    pub media: Option<AniListMedia>,
    pub score: Option<f64>,
    pub progress: Option<u32>,
    #[serde(rename = "progressVolumes")]
    pub progress_volumes: Option<u32>,
    pub status: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<i64>,
}

// ── Conversions ──────────────────────────────────────────────────

impl AniListTitle {
    /// English title unless empty, otherwise romaji.
    pub fn preferred(&self) -> Option<&str> {
        self.english
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.romaji.as_deref())
    }
}

impl AniListMedia {
    /// `None` when the server returned no media (id absent or zero).
    ///
    /// `default_kind` is used for the detail URL when the query did not
    /// select the media `type`.
    pub fn into_item(self, default_kind: MediaKind) -> Option<AnilistItem> {
        if self.id == 0 {
            return None;
        }

        let kind = self
            .media_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(default_kind);

        Some(AnilistItem {
            id: self.id,
            url: media_url(kind, self.id),
            score: self.average_score,
            episodes: self.episodes,
            chapters: self.chapters,
            volumes: self.volumes,
            title: self
                .title
                .as_ref()
                .and_then(|t| t.preferred())
                .map(str::to_string),
            cover_url: self.cover_image.and_then(|c| c.extra_large),
        })
    }
}

impl MediaListCollection {
    /// Flatten every list group into its entries, in server order.
    pub fn into_entries(self) -> impl Iterator<Item = MediaListEntry> {
        self.lists
            .unwrap_or_default()
            .into_iter()
            .flat_map(|group| group.entries.unwrap_or_default())
    }
}

impl MediaListEntry {
    pub fn into_update(self, user_name: &str, kind: MediaKind) -> Update {
        let media = self.media.unwrap_or_default();
        let title = media
            .title
            .as_ref()
            .and_then(|t| t.preferred())
            .unwrap_or_default()
            .to_string();

        let mut update = Update {
            user_name: user_name.to_string(),
            media_id: self.media_id,
            media_kind: kind,
            title,
            url: media_url(kind, self.media_id),
            cover_url: media.cover_image.and_then(|c| c.extra_large),
            status: self.status.unwrap_or_default(),
            updated_at: self
                .updated_at
                .filter(|&ts| ts > 0)
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            score: self.score.map(|s| s.round() as u32),
            progress: self.progress,
            progress_volumes: None,
            total_episodes: None,
            total_volumes: None,
            total_chapters: None,
        };

        match kind {
            MediaKind::Anime => {
                update.total_episodes = media.episodes;
            }
            MediaKind::Manga => {
                update.progress_volumes = self.progress_volumes;
                update.total_volumes = media.volumes;
                update.total_chapters = media.chapters;
            }
        }

        update
    }
}

impl From<ViewerNode> for Viewer {
    fn from(node: ViewerNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
        }
    }
}
