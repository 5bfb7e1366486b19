//! User resources: identity, profile and collection folders.

use serde::{Deserialize, Serialize};

/// The account an OAuth token or personal token belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,

    pub username: String,

    #[serde(default)]
    pub consumer_name: Option<String>,

    #[serde(default)]
    pub resource_url: Option<String>,
}

/// A user profile. `email` is only present when viewing your own profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,

    pub username: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub home_page: Option<String>,

    /// ISO 8601 registration timestamp.
    #[serde(default)]
    pub registered: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub num_collection: Option<u64>,

    #[serde(default)]
    pub num_wantlist: Option<u64>,

    #[serde(default)]
    pub rating_avg: Option<f64>,

    #[serde(default)]
    pub resource_url: Option<String>,
}

/// A folder in a user's collection. Folder `0` is "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFolder {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub resource_url: Option<String>,
}

/// Response wrapper for the folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFolders {
    #[serde(default)]
    pub folders: Vec<CollectionFolder>,
}
