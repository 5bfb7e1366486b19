//! Declared API operations and their authorization requirements.

use crate::auth::{ApiOperation, AuthRequirement};

pub const GET_IDENTITY: ApiOperation =
    ApiOperation::new("Identity", "get_identity", AuthRequirement::Required);

pub const GET_RELEASE: ApiOperation =
    ApiOperation::new("Database", "get_release", AuthRequirement::None);

pub const GET_ARTIST: ApiOperation =
    ApiOperation::new("Database", "get_artist", AuthRequirement::None);

/// Discogs only serves database search to authenticated callers.
pub const SEARCH: ApiOperation = ApiOperation::new("Database", "search", AuthRequirement::Required);

/// Anonymous callers see the public profile only.
pub const GET_PROFILE: ApiOperation =
    ApiOperation::new("User", "get_profile", AuthRequirement::Optional);

/// Anonymous callers see public folders only.
pub const GET_FOLDERS: ApiOperation =
    ApiOperation::new("Collection", "get_folders", AuthRequirement::Optional);

/// Every operation the client exposes.
pub const ALL: &[ApiOperation] =
    &[GET_IDENTITY, GET_RELEASE, GET_ARTIST, SEARCH, GET_PROFILE, GET_FOLDERS];

/// Look up an operation by resource and name.
#[must_use]
pub fn find(resource: &str, name: &str) -> Option<&'static ApiOperation> {
    ALL.iter().find(|op| op.resource == resource && op.name == name)
}
