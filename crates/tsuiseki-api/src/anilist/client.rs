use std::ops::Deref;

use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;

use super::error::AniListError;
use super::transport::{GraphQLRequest, HttpTransport, Transport};
use super::types::{
    FollowingPageResponse, GraphQLError, GraphQLResponse, MediaListCollectionResponse,
    MediaListResponse, MediaResponse, UserResponse, ViewerResponse,
};
use crate::models::{AnilistItem, MediaKind, Update, Viewer};
use crate::season::{retry_offset, SeasonGuess, OFFSET_RANGE};

/// Users requested per page when enumerating followings.
pub const FOLLOWING_PAGE_SIZE: u32 = 20;

const SEARCH_QUERY: &str = r#"
query ($title: String) {
    Media(type: ANIME, search: $title) {
        id
        title { romaji english }
        coverImage { extraLarge }
        episodes
        chapters
        volumes
        averageScore
    }
}
"#;

const SEASON_SEARCH_QUERY: &str = r#"
query ($title: String, $season: MediaSeason, $seasonYear: Int) {
    Media(type: ANIME, search: $title, season: $season, seasonYear: $seasonYear) {
        id
        title { romaji english }
        coverImage { extraLarge }
        episodes
        chapters
        volumes
        averageScore
    }
}
"#;

const MEDIA_BY_ID_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id) {
        id
        type
        title { romaji english }
        coverImage { extraLarge }
        episodes
        chapters
        volumes
        averageScore
    }
}
"#;

const USER_QUERY: &str = r#"
query ($name: String) {
    User(name: $name) {
        id
    }
}
"#;

const FOLLOWING_QUERY: &str = r#"
query ($id: Int!, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo { hasNextPage }
        users: following(userId: $id) {
            name
        }
    }
}
"#;

const UPDATES_QUERY: &str = r#"
query ($userName: String, $type: MediaType) {
    MediaListCollection(userName: $userName, type: $type) {
        lists {
            entries {
                mediaId
                media {
                    title { english romaji }
                    coverImage { extraLarge }
                    episodes
                    chapters
                    volumes
                }
                score(format: POINT_100)
                progress
                progressVolumes
                status
                updatedAt
            }
        }
    }
}
"#;

const PROGRESS_QUERY: &str = r#"
query ($userName: String, $mediaId: Int) {
    MediaList(userName: $userName, mediaId: $mediaId) {
        progress
    }
}
"#;

const UPDATE_PROGRESS_MUTATION: &str = r#"
mutation ($mediaId: Int, $progress: Int, $status: MediaListStatus) {
    SaveMediaListEntry(mediaId: $mediaId, progress: $progress, status: $status) {
        id
        progress
        status
    }
}
"#;

const VIEWER_QUERY: &str = r#"
query {
    Viewer {
        id
        name
    }
}
"#;

/// AniList GraphQL API client for public (read-only) queries.
///
/// A miss (no media, no list entry, unknown user) is reported as an empty
/// value, never as an error. Errors mean the request itself failed.
#[derive(Debug, Clone)]
pub struct AniListClient<T = HttpTransport> {
    transport: T,
    access_token: Option<String>,
    strict_graphql_errors: bool,
}

impl AniListClient<HttpTransport> {
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}

impl Default for AniListClient<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> AniListClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            access_token: None,
            strict_graphql_errors: false,
        }
    }

    /// Fail on GraphQL `errors` in a successful response instead of only
    /// logging them. "Not found" errors never fail.
    pub fn strict_graphql_errors(mut self, strict: bool) -> Self {
        self.strict_graphql_errors = strict;
        self
    }

    /// Attach a bearer token to every request from now on.
    pub fn authenticated(mut self, access_token: String) -> AuthenticatedClient<T> {
        self.access_token = Some(access_token);
        AuthenticatedClient { client: self }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn graphql_request<D: DeserializeOwned + Default>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<D, AniListError> {
        let request = GraphQLRequest {
            operation,
            query,
            variables,
        };
        let body = self
            .transport
            .execute(&request, self.access_token.as_deref())
            .await?;

        let resp: GraphQLResponse<D> =
            serde_json::from_value(body).map_err(|e| AniListError::Parse(e.to_string()))?;
        self.check_graphql_errors(operation, &resp.errors)?;

        Ok(resp.data.unwrap_or_default())
    }

    fn check_graphql_errors(
        &self,
        operation: &str,
        errors: &[GraphQLError],
    ) -> Result<(), AniListError> {
        let mut failures = Vec::new();
        for error in errors {
            if error.is_not_found() {
                tracing::debug!(operation, message = %error.message, "AniList: not found");
            } else {
                tracing::warn!(operation, message = %error.message, "AniList GraphQL error");
                failures.push(error.message.as_str());
            }
        }

        if self.strict_graphql_errors && !failures.is_empty() {
            return Err(AniListError::GraphQL(failures.join("; ")));
        }
        Ok(())
    }

    /// Find an anime by title, refined by the season of its first episode.
    ///
    /// Without a date this is a plain title search.
    pub async fn find_item(
        &self,
        title: &str,
        first_episode: Option<NaiveDate>,
    ) -> Result<Option<AnilistItem>, AniListError> {
        self.find_item_with_offset(title, first_episode, 0).await
    }

    /// Like [`find_item`](Self::find_item), starting from the season `offset`
    /// steps away from the one the date falls in.
    ///
    /// With `offset == 0` a miss in a season's first month is retried once
    /// against the previous season, and a miss in its last month once
    /// against the next. Any other miss is final. `offset` must lie in
    /// [`OFFSET_RANGE`]; anything else fails before a request is made.
    pub async fn find_item_with_offset(
        &self,
        title: &str,
        first_episode: Option<NaiveDate>,
        offset: i32,
    ) -> Result<Option<AnilistItem>, AniListError> {
        if !OFFSET_RANGE.contains(&offset) {
            return Err(AniListError::InvalidOffset(offset));
        }

        let Some(date) = first_episode else {
            return self.search_title(title).await;
        };

        let retry = if offset == 0 {
            retry_offset(date.month())
        } else {
            None
        };

        for offset in std::iter::once(offset).chain(retry) {
            let guess = SeasonGuess::from_date(date, offset)?;
            tracing::debug!(title, season = %guess, offset, "AniList season search");
            if let Some(item) = self.search_season(title, guess).await? {
                return Ok(Some(item));
            }
        }

        Ok(None)
    }

    async fn search_title(&self, title: &str) -> Result<Option<AnilistItem>, AniListError> {
        let resp: MediaResponse = self
            .graphql_request(
                "SearchTitle",
                SEARCH_QUERY,
                serde_json::json!({ "title": title }),
            )
            .await?;
        Ok(resp.media.and_then(|m| m.into_item(MediaKind::Anime)))
    }

    async fn search_season(
        &self,
        title: &str,
        guess: SeasonGuess,
    ) -> Result<Option<AnilistItem>, AniListError> {
        let resp: MediaResponse = self
            .graphql_request(
                "SearchSeason",
                SEASON_SEARCH_QUERY,
                serde_json::json!({
                    "title": title,
                    "season": guess.season.to_anilist_str(),
                    "seasonYear": guess.year,
                }),
            )
            .await?;
        Ok(resp.media.and_then(|m| m.into_item(MediaKind::Anime)))
    }

    /// Fetch a media entry by its AniList id.
    pub async fn get_item_by_id(&self, id: u64) -> Result<Option<AnilistItem>, AniListError> {
        let resp: MediaResponse = self
            .graphql_request(
                "MediaById",
                MEDIA_BY_ID_QUERY,
                serde_json::json!({ "id": id }),
            )
            .await?;
        Ok(resp.media.and_then(|m| m.into_item(MediaKind::Anime)))
    }

    /// Names of every user `username` follows, in server order.
    ///
    /// Pages are fetched one after another until the server reports no
    /// next page. A failed page discards everything collected so far.
    pub async fn get_following_names(&self, username: &str) -> Result<Vec<String>, AniListError> {
        let resp: UserResponse = self
            .graphql_request("User", USER_QUERY, serde_json::json!({ "name": username }))
            .await?;
        let Some(user) = resp.user else {
            tracing::debug!(username, "AniList user not found");
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        let mut page = 1u32;
        loop {
            let resp: FollowingPageResponse = self
                .graphql_request(
                    "Following",
                    FOLLOWING_QUERY,
                    serde_json::json!({
                        "id": user.id,
                        "page": page,
                        "perPage": FOLLOWING_PAGE_SIZE,
                    }),
                )
                .await?;
            let Some(data) = resp.page else { break };

            let has_next = data.page_info.is_some_and(|p| p.has_next_page);
            names.extend(data.users.unwrap_or_default().into_iter().map(|u| u.name));
            tracing::debug!(page, total = names.len(), has_next, "AniList following page");

            if !has_next {
                break;
            }
            page += 1;
        }

        Ok(names)
    }

    /// A user's whole anime or manga list, flattened into updates.
    ///
    /// `media_type` must be exactly `ANIME` or `MANGA`; anything else is
    /// rejected before a request is made.
    pub async fn get_updates(
        &self,
        username: &str,
        media_type: &str,
    ) -> Result<Vec<Update>, AniListError> {
        let kind: MediaKind = media_type.parse()?;
        self.get_updates_for(username, kind).await
    }

    pub async fn get_updates_for(
        &self,
        username: &str,
        kind: MediaKind,
    ) -> Result<Vec<Update>, AniListError> {
        let resp: MediaListCollectionResponse = self
            .graphql_request(
                "Updates",
                UPDATES_QUERY,
                serde_json::json!({
                    "userName": username,
                    "type": kind.as_str(),
                }),
            )
            .await?;

        Ok(resp
            .media_list_collection
            .map(|collection| {
                collection
                    .into_entries()
                    .map(|entry| entry.into_update(username, kind))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Progress recorded by `username` for a media entry.
    ///
    /// Returns 0 when there is no entry or no progress, which is
    /// indistinguishable from an explicit progress of zero.
    pub async fn get_progress(&self, username: &str, media_id: u64) -> Result<u32, AniListError> {
        let resp: MediaListResponse = self
            .graphql_request(
                "Progress",
                PROGRESS_QUERY,
                serde_json::json!({
                    "userName": username,
                    "mediaId": media_id,
                }),
            )
            .await?;
        Ok(resp.media_list.and_then(|e| e.progress).unwrap_or(0))
    }
}

/// AniList client holding a bearer token, required for list mutations.
///
/// Read operations of [`AniListClient`] are available through `Deref` and
/// also carry the token.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient<T = HttpTransport> {
    client: AniListClient<T>,
}

impl AuthenticatedClient<HttpTransport> {
    pub fn new(access_token: String) -> Self {
        AniListClient::new().authenticated(access_token)
    }
}

impl<T: Transport> AuthenticatedClient<T> {
    /// Set progress and list status for a media entry.
    ///
    /// `status` is passed through as an AniList `MediaListStatus` value
    /// (`CURRENT`, `PLANNING`, `COMPLETED`, ...) without validation.
    pub async fn update_progress(
        &self,
        media_id: u64,
        progress: u32,
        status: &str,
    ) -> Result<(), AniListError> {
        let _: serde_json::Value = self
            .client
            .graphql_request(
                "UpdateProgress",
                UPDATE_PROGRESS_MUTATION,
                serde_json::json!({
                    "mediaId": media_id,
                    "progress": progress,
                    "status": status,
                }),
            )
            .await?;
        Ok(())
    }

    /// The user the token belongs to.
    pub async fn viewer(&self) -> Result<Option<Viewer>, AniListError> {
        let resp: ViewerResponse = self
            .client
            .graphql_request("Viewer", VIEWER_QUERY, serde_json::json!({}))
            .await?;
        Ok(resp.viewer.map(Viewer::from))
    }
}

impl<T> Deref for AuthenticatedClient<T> {
    type Target = AniListClient<T>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
