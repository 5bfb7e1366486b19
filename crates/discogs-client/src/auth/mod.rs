//! Authentication: credential types, per-scheme managers, the OAuth 1.0a
//! handshake with its loopback redirect receiver, and the call-site verifier.

mod credential;
pub mod landing;
mod manager;
pub mod oauth;
pub mod receiver;
pub mod verifier;

use std::sync::Arc;

pub use credential::{CredentialInfo, KeySecret, OAuthToken, PersonalToken, REDACTED};
pub use manager::{
    CredentialManager, DISCOGS_SCHEME, KeySecretCredentials, NoCredentials, TokenCredentials,
};
pub use oauth::{
    AccessTokenResult, AuthorizationPrompt, BrowserPrompt, OAuthEndpoints, OAuthManager,
    OAuthSettings, RequestTokenResult,
};
pub use receiver::{LocalRedirectReceiver, ReceiverConfig};
pub use verifier::{ApiOperation, AuthRequirement, verify_before_call};

use crate::config::AuthConfig;

/// `application/x-www-form-urlencoded` escaping.
#[must_use]
pub fn url_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Build the credential manager for an authentication mode.
///
/// `http` is used only for the OAuth handshake endpoints.
#[must_use]
pub fn credential_manager(auth: &AuthConfig, http: reqwest::Client) -> Arc<dyn CredentialManager> {
    match auth {
        AuthConfig::None => Arc::new(NoCredentials),
        AuthConfig::KeySecret(credential) => Arc::new(KeySecretCredentials::new(credential.clone())),
        AuthConfig::Token(credential) => Arc::new(TokenCredentials::new(credential.clone())),
        AuthConfig::OAuth(settings) => Arc::new(OAuthManager::new(http, settings.clone())),
    }
}
