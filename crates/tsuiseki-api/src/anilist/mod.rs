pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{AniListClient, AuthenticatedClient, FOLLOWING_PAGE_SIZE};
pub use error::AniListError;
pub use transport::{GraphQLRequest, HttpTransport, Transport, API_URL};
