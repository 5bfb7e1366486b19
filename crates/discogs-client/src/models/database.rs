//! Database resources: releases, artists and search.

use serde::{Deserialize, Serialize};

/// A release (a specific pressing of a recording).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,

    pub title: String,

    #[serde(default)]
    pub year: Option<i32>,

    /// Release date as given by the submitter (`1987`, `1987-06`, `1987-06-01`).
    #[serde(default)]
    pub released: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub artists: Vec<ArtistCredit>,

    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default)]
    pub styles: Vec<String>,

    #[serde(default)]
    pub tracklist: Vec<Track>,

    /// Public web page.
    #[serde(default)]
    pub uri: Option<String>,

    /// API URL of this resource.
    #[serde(default)]
    pub resource_url: Option<String>,
}

/// An artist as credited on a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCredit {
    pub id: u64,

    pub name: String,

    /// Credit-specific name variation.
    #[serde(default)]
    pub anv: Option<String>,

    /// Joining text to the next credited artist (`&`, `feat.`).
    #[serde(default)]
    pub join: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub resource_url: Option<String>,
}

/// One entry of a release tracklist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub position: String,

    pub title: String,

    #[serde(default)]
    pub duration: Option<String>,
}

/// An artist, group or alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub realname: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub resource_url: Option<String>,
}

/// Page position within a paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,

    pub pages: u32,

    pub per_page: u32,

    pub items: u64,
}

impl Pagination {
    /// Check if there are more pages after this one.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.pages
    }
}

/// A page of database search hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub pagination: Pagination,

    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A single search hit. `kind` is `release`, `master`, `artist` or `label`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,

    #[serde(rename = "type")]
    pub kind: String,

    pub title: String,

    #[serde(default)]
    pub year: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub thumb: Option<String>,

    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub resource_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_deserialize_minimal() {
        let release: Release = serde_json::from_str(r#"{"id": 249504, "title": "Never Gonna Give You Up"}"#).unwrap();
        assert_eq!(release.id, 249_504);
        assert!(release.artists.is_empty());
        assert!(release.year.is_none());
    }

    #[test]
    fn test_release_deserialize_full() {
        let json = r#"{
            "id": 249504,
            "title": "Never Gonna Give You Up",
            "year": 1987,
            "country": "UK",
            "artists": [{"id": 72872, "name": "Rick Astley", "anv": "", "join": "", "role": ""}],
            "genres": ["Electronic", "Pop"],
            "tracklist": [{"position": "A", "title": "Never Gonna Give You Up", "duration": "3:32"}],
            "community": {"have": 1}
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.year, Some(1987));
        assert_eq!(release.artists[0].name, "Rick Astley");
        assert_eq!(release.tracklist[0].duration.as_deref(), Some("3:32"));
    }

    #[test]
    fn test_search_results_type_field() {
        let json = r#"{
            "pagination": {"page": 1, "pages": 3, "per_page": 50, "items": 120, "urls": {}},
            "results": [{"id": 1, "type": "artist", "title": "Nirvana"}]
        }"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        assert!(results.pagination.has_more());
        assert_eq!(results.results[0].kind, "artist");
    }
}
