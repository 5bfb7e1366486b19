//! Response models for the Discogs API.
//!
//! Fields the API may omit use `#[serde(default)]`; unknown fields are ignored.

mod database;
mod user;

pub use database::{
    Artist, ArtistCredit, Pagination, Release, SearchResult, SearchResults, Track,
};
pub use user::{CollectionFolder, CollectionFolders, Identity, UserProfile};
