//! Client library for the AniList GraphQL API.
//!
//! Media lookup by title (with season refinement) or id, follower
//! enumeration, list updates, and progress tracking.

pub mod anilist;
pub mod models;
pub mod season;

pub use anilist::{AniListClient, AniListError, AuthenticatedClient, HttpTransport, Transport};
pub use models::{AnilistItem, MediaKind, Update, Viewer};
pub use season::{Season, SeasonGuess, OFFSET_RANGE};
