//! Per-scheme credential managers.

use reqwest::header::AUTHORIZATION;
use reqwest_middleware::RequestBuilder;

use super::credential::{CredentialInfo, KeySecret, PersonalToken};
use super::url_escape;
use crate::error::AuthResult;

/// Scheme name used in the `Authorization` header for key/secret and token auth.
pub const DISCOGS_SCHEME: &str = "Discogs";

/// Attaches credentials to outgoing requests.
#[async_trait::async_trait]
pub trait CredentialManager: Send + Sync + std::fmt::Debug {
    /// The credential requests are signed with.
    ///
    /// For OAuth this runs the handshake the first time it is called.
    async fn current_credential(&self) -> AuthResult<CredentialInfo>;

    /// True unless the scheme is `None`.
    fn is_authenticated(&self) -> bool;

    /// Value for the `Authorization` header, if the scheme sends one.
    async fn authorization_header(&self) -> AuthResult<Option<String>>;

    /// Attach the `Authorization` header to a request.
    async fn decorate(&self, request: RequestBuilder) -> AuthResult<RequestBuilder> {
        Ok(match self.authorization_header().await? {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        })
    }
}

/// Anonymous access. Requests go out undecorated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait::async_trait]
impl CredentialManager for NoCredentials {
    async fn current_credential(&self) -> AuthResult<CredentialInfo> {
        Ok(CredentialInfo::None)
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    async fn authorization_header(&self) -> AuthResult<Option<String>> {
        Ok(None)
    }
}

/// Consumer key and secret sent on every request.
#[derive(Clone)]
pub struct KeySecretCredentials {
    credential: KeySecret,
    header: String,
}

impl KeySecretCredentials {
    #[must_use]
    pub fn new(credential: KeySecret) -> Self {
        let header = format!(
            "{DISCOGS_SCHEME} key={}, secret={}",
            url_escape(credential.key()),
            url_escape(credential.secret())
        );
        Self { credential, header }
    }
}

impl std::fmt::Debug for KeySecretCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySecretCredentials").field("credential", &self.credential).finish()
    }
}

#[async_trait::async_trait]
impl CredentialManager for KeySecretCredentials {
    async fn current_credential(&self) -> AuthResult<CredentialInfo> {
        Ok(CredentialInfo::KeySecret(self.credential.clone()))
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    async fn authorization_header(&self) -> AuthResult<Option<String>> {
        Ok(Some(self.header.clone()))
    }
}

/// Personal access token sent on every request.
#[derive(Clone)]
pub struct TokenCredentials {
    credential: PersonalToken,
    header: String,
}

impl TokenCredentials {
    #[must_use]
    pub fn new(credential: PersonalToken) -> Self {
        let header = format!("{DISCOGS_SCHEME} token={}", url_escape(credential.value()));
        Self { credential, header }
    }
}

impl std::fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCredentials").field("credential", &self.credential).finish()
    }
}

#[async_trait::async_trait]
impl CredentialManager for TokenCredentials {
    async fn current_credential(&self) -> AuthResult<CredentialInfo> {
        Ok(CredentialInfo::Token(self.credential.clone()))
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    async fn authorization_header(&self) -> AuthResult<Option<String>> {
        Ok(Some(self.header.clone()))
    }
}
