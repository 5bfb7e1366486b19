//! OAuth 1.0a three-legged handshake with PLAINTEXT signatures.
//!
//! 1. `GET request_token` signed with the consumer secret, carrying `oauth_callback`.
//! 2. The user approves access at `authorize?oauth_token=..` in a browser; the provider
//!    redirects to the local receiver with `oauth_verifier`.
//! 3. `POST access_token` signed with consumer secret and request token secret.
//!
//! The resulting access token is held for the lifetime of the [`OAuthManager`].

use std::sync::Arc;
use std::time::Duration;

use rand::distr::{Alphanumeric, SampleString};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::credential::{CredentialInfo, KeySecret, OAuthToken, REDACTED};
use super::manager::CredentialManager;
use super::receiver::{LocalRedirectReceiver, ReceiverConfig};
use super::url_escape;
use crate::config::api;
use crate::error::{AuthError, AuthResult};

/// Length of the per-request nonce.
pub const NONCE_LENGTH: usize = 12;

const SIGNATURE_METHOD: &str = "PLAINTEXT";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Provider endpoints for the three legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub request_token_url: String,
    pub authorize_url: String,
    pub access_token_url: String,
}

impl OAuthEndpoints {
    /// Endpoints under a mock server base URL.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            request_token_url: format!("{base_url}/oauth/request_token"),
            authorize_url: format!("{base_url}/oauth/authorize"),
            access_token_url: format!("{base_url}/oauth/access_token"),
        }
    }
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            request_token_url: api::REQUEST_TOKEN_URL.to_string(),
            authorize_url: api::AUTHORIZE_URL.to_string(),
            access_token_url: api::ACCESS_TOKEN_URL.to_string(),
        }
    }
}

/// Settings for an [`OAuthManager`].
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    /// Application consumer key and secret.
    pub consumer: KeySecret,
    /// Access token obtained earlier; skips the handshake when set.
    pub token: Option<OAuthToken>,
    /// Where the redirect receiver listens.
    pub receiver: ReceiverConfig,
    /// Provider endpoints.
    pub endpoints: OAuthEndpoints,
    /// Bound on the wait for the browser redirect. `None` waits indefinitely.
    pub callback_timeout: Option<Duration>,
    /// Try to open the authorize URL in the system browser.
    pub open_browser: bool,
}

impl OAuthSettings {
    #[must_use]
    pub fn new(consumer: KeySecret) -> Self {
        Self {
            consumer,
            token: None,
            receiver: ReceiverConfig::default(),
            endpoints: OAuthEndpoints::default(),
            callback_timeout: Some(api::CALLBACK_TIMEOUT),
            open_browser: true,
        }
    }
}

/// Output of the request token leg.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestTokenResult {
    pub token: String,
    pub secret: String,
    pub callback_confirmed: bool,
}

impl RequestTokenResult {
    /// Parse `oauth_token=..&oauth_token_secret=..&oauth_callback_confirmed=..`.
    pub fn parse(body: &str) -> AuthResult<Self> {
        const STEP: &str = "request token";
        let response = TokenResponse::parse(STEP, body)?;
        Ok(Self {
            token: required(STEP, "oauth_token", response.oauth_token)?,
            secret: required(STEP, "oauth_token_secret", response.oauth_token_secret)?,
            callback_confirmed: response.oauth_callback_confirmed.as_deref() == Some("true"),
        })
    }
}

impl std::fmt::Debug for RequestTokenResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTokenResult")
            .field("token", &self.token)
            .field("secret", &REDACTED)
            .field("callback_confirmed", &self.callback_confirmed)
            .finish()
    }
}

/// Output of the access token leg.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessTokenResult {
    pub access_token: String,
    pub access_token_secret: String,
}

impl AccessTokenResult {
    /// Parse `oauth_token=..&oauth_token_secret=..`.
    pub fn parse(body: &str) -> AuthResult<Self> {
        const STEP: &str = "access token";
        let response = TokenResponse::parse(STEP, body)?;
        Ok(Self {
            access_token: required(STEP, "oauth_token", response.oauth_token)?,
            access_token_secret: required(STEP, "oauth_token_secret", response.oauth_token_secret)?,
        })
    }

    pub fn into_token(self) -> AuthResult<OAuthToken> {
        OAuthToken::new(self.access_token, self.access_token_secret)
    }
}

impl std::fmt::Debug for AccessTokenResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenResult")
            .field("access_token", &REDACTED)
            .field("access_token_secret", &REDACTED)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    oauth_token: Option<String>,
    oauth_token_secret: Option<String>,
    oauth_callback_confirmed: Option<String>,
}

impl TokenResponse {
    fn parse(step: &str, body: &str) -> AuthResult<Self> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AuthError::authentication(format!("{step} response body was empty")));
        }
        serde_urlencoded::from_str(body).map_err(|e| {
            AuthError::authentication(format!("{step} response was not form-encoded: {e}"))
        })
    }
}

fn required(step: &str, field: &str, value: Option<String>) -> AuthResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AuthError::authentication(format!("{step} response missing {field}")))
}

/// Fresh alphanumeric nonce from the thread-local CSPRNG.
#[must_use]
pub fn nonce() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), NONCE_LENGTH)
}

/// `OAuth k="v", ...` header value with the common prefix parameters.
struct OAuthHeader {
    params: Vec<(&'static str, String)>,
}

impl OAuthHeader {
    fn new(consumer_key: &str) -> Self {
        Self {
            params: vec![
                ("oauth_consumer_key", consumer_key.to_string()),
                ("oauth_nonce", nonce()),
                ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
                ("oauth_timestamp", chrono::Utc::now().timestamp_millis().to_string()),
            ],
        }
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    fn render(&self) -> String {
        let params: Vec<String> =
            self.params.iter().map(|(name, value)| format!(r#"{name}="{value}""#)).collect();
        format!("OAuth {}", params.join(", "))
    }
}

/// Header for the request token leg.
#[must_use]
pub fn request_token_header(consumer: &KeySecret, callback: &str) -> String {
    OAuthHeader::new(consumer.key())
        .param("oauth_signature", format!("{}&", consumer.secret()))
        .param("oauth_callback", callback)
        .render()
}

/// Header for the access token leg.
#[must_use]
pub fn access_token_header(
    consumer: &KeySecret,
    request: &RequestTokenResult,
    verifier: &str,
) -> String {
    OAuthHeader::new(consumer.key())
        .param("oauth_token", request.token.as_str())
        .param("oauth_signature", format!("{}&{}", consumer.secret(), request.secret))
        .param("oauth_verifier", verifier)
        .render()
}

/// Header for an API request signed with an access token.
#[must_use]
pub fn signed_request_header(consumer: &KeySecret, token: &OAuthToken) -> String {
    OAuthHeader::new(consumer.key())
        .param("oauth_token", token.token())
        .param("oauth_signature", format!("{}&{}", consumer.secret(), token.secret()))
        .render()
}

/// Shows the authorize URL to the user.
pub trait AuthorizationPrompt: Send + Sync {
    fn present(&self, authorize_url: &str);
}

/// Prints the authorize URL to stderr and tries to open the system browser.
#[derive(Debug, Clone, Copy)]
pub struct BrowserPrompt {
    pub open_browser: bool,
}

impl AuthorizationPrompt for BrowserPrompt {
    fn present(&self, authorize_url: &str) {
        eprintln!("Authorize access to your Discogs account by visiting:\n\n    {authorize_url}\n");
        if !self.open_browser {
            return;
        }
        if let Err(e) = open::that_detached(authorize_url) {
            tracing::warn!(error = %e, "Could not open a browser, visit the URL manually");
        }
    }
}

/// OAuth 1.0a credential manager.
///
/// The first credential request runs the handshake; concurrent requests wait on the
/// same lock and share its result. A failed handshake leaves no token behind, so the
/// next request starts over.
///
/// Each handshake attempt owns a fresh [`LocalRedirectReceiver`]. Dropping the
/// handshake future (a caller timeout, an aborted task) drops the listener with it,
/// so an abandoned attempt never holds the port or leaks its redirect into a retry.
pub struct OAuthManager {
    http: reqwest::Client,
    consumer: KeySecret,
    endpoints: OAuthEndpoints,
    receiver: ReceiverConfig,
    callback_timeout: Option<Duration>,
    prompt: Arc<dyn AuthorizationPrompt>,
    token: Mutex<Option<OAuthToken>>,
}

impl OAuthManager {
    #[must_use]
    pub fn new(http: reqwest::Client, settings: OAuthSettings) -> Self {
        Self {
            http,
            consumer: settings.consumer,
            endpoints: settings.endpoints,
            receiver: settings.receiver,
            callback_timeout: settings.callback_timeout,
            prompt: Arc::new(BrowserPrompt { open_browser: settings.open_browser }),
            token: Mutex::new(settings.token),
        }
    }

    /// Replace how the authorize URL is presented.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn AuthorizationPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Where each attempt's redirect receiver listens.
    #[must_use]
    pub const fn receiver_config(&self) -> &ReceiverConfig {
        &self.receiver
    }

    /// True once an access token is held.
    pub async fn has_token(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Browser URL for approving `request_token`.
    #[must_use]
    pub fn authorize_url(&self, request_token: &str) -> String {
        format!("{}?oauth_token={}", self.endpoints.authorize_url, url_escape(request_token))
    }

    /// First leg: obtain a request token bound to the receiver's redirect URI.
    pub async fn request_token(&self) -> AuthResult<RequestTokenResult> {
        let header = request_token_header(&self.consumer, &self.receiver.redirect_uri());
        let response = self
            .http
            .get(&self.endpoints.request_token_url)
            .header(AUTHORIZATION, header)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .send()
            .await?;

        let body = success_body("request token", response).await?;
        RequestTokenResult::parse(&body)
    }

    /// Third leg: exchange the approved request token for an access token.
    pub async fn access_token(
        &self,
        request: &RequestTokenResult,
        verifier: &str,
    ) -> AuthResult<AccessTokenResult> {
        let header = access_token_header(&self.consumer, request, verifier);
        let response = self
            .http
            .post(&self.endpoints.access_token_url)
            .header(AUTHORIZATION, header)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body("")
            .send()
            .await?;

        let body = success_body("access token", response).await?;
        AccessTokenResult::parse(&body)
    }

    /// Run the full handshake and return the new credential.
    ///
    /// Does not store the result; [`current_credential`](CredentialManager::current_credential)
    /// is the cached entry point.
    pub async fn authenticate(&self) -> AuthResult<CredentialInfo> {
        self.handshake().await.map(CredentialInfo::OAuth)
    }

    async fn handshake(&self) -> AuthResult<OAuthToken> {
        tracing::info!(consumer_key = %self.consumer.key(), "Starting OAuth handshake");

        let request = self.request_token().await?;
        if !request.callback_confirmed {
            tracing::warn!("Provider did not confirm the callback URL");
        }

        let receiver = LocalRedirectReceiver::new(self.receiver.clone());
        receiver.start().await?;
        let verifier = self.await_verifier(&receiver, &request).await;
        receiver.stop().await;
        let verifier = verifier?;

        let access = self.access_token(&request, &verifier).await?;
        tracing::info!("OAuth handshake complete");
        access.into_token()
    }

    async fn await_verifier(
        &self,
        receiver: &LocalRedirectReceiver,
        request: &RequestTokenResult,
    ) -> AuthResult<String> {
        self.prompt.present(&self.authorize_url(&request.token));

        let code = match self.callback_timeout {
            Some(timeout) => receiver.wait_for_code_timeout(timeout).await?,
            None => receiver.wait_for_code().await?,
        };
        code.ok_or_else(|| {
            AuthError::authentication("redirect receiver stopped before a verifier arrived")
        })
    }

    async fn acquire(&self) -> AuthResult<OAuthToken> {
        let mut held = self.token.lock().await;
        if let Some(token) = held.as_ref() {
            return Ok(token.clone());
        }

        let token = self.handshake().await.inspect_err(|e| {
            tracing::warn!(error = %e, "OAuth handshake failed");
        })?;
        *held = Some(token.clone());
        Ok(token)
    }
}

impl std::fmt::Debug for OAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthManager")
            .field("consumer", &self.consumer)
            .field("endpoints", &self.endpoints)
            .field("redirect_uri", &self.receiver.redirect_uri())
            .finish()
    }
}

#[async_trait::async_trait]
impl CredentialManager for OAuthManager {
    async fn current_credential(&self) -> AuthResult<CredentialInfo> {
        self.acquire().await.map(CredentialInfo::OAuth)
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    async fn authorization_header(&self) -> AuthResult<Option<String>> {
        let token = self.acquire().await?;
        Ok(Some(signed_request_header(&self.consumer, &token)))
    }
}

async fn success_body(step: &str, response: reqwest::Response) -> AuthResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(AuthError::authentication(format!(
            "{step} request returned {status}: {}",
            body.trim()
        )));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumer() -> KeySecret {
        KeySecret::new("ckey", "csecret").unwrap()
    }

    /// Parameter names and values in header order.
    fn header_params(header: &str) -> Vec<(String, String)> {
        header
            .strip_prefix("OAuth ")
            .unwrap()
            .split(", ")
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap();
                (name.to_string(), value.trim_matches('"').to_string())
            })
            .collect()
    }

    #[test]
    fn test_nonce_shape() {
        let a = nonce();
        let b = nonce();
        assert_eq!(a.len(), NONCE_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_token_header() {
        let header = request_token_header(&consumer(), "http://localhost:8484/Callback");
        let params = header_params(&header);
        let names: Vec<&str> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            [
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_signature",
                "oauth_callback"
            ]
        );
        assert_eq!(params[0].1, "ckey");
        assert_eq!(params[2].1, "PLAINTEXT");
        assert!(params[3].1.parse::<i64>().is_ok());
        assert_eq!(params[4].1, "csecret&");
        assert_eq!(params[5].1, "http://localhost:8484/Callback");
    }

    #[test]
    fn test_access_token_header() {
        let request = RequestTokenResult {
            token: "T".into(),
            secret: "S".into(),
            callback_confirmed: true,
        };
        let params = header_params(&access_token_header(&consumer(), &request, "V"));
        assert_eq!(params[4], ("oauth_token".to_string(), "T".to_string()));
        assert_eq!(params[5], ("oauth_signature".to_string(), "csecret&S".to_string()));
        assert_eq!(params[6], ("oauth_verifier".to_string(), "V".to_string()));
    }

    #[test]
    fn test_signed_request_header() {
        let token = OAuthToken::new("AT", "AS").unwrap();
        let params = header_params(&signed_request_header(&consumer(), &token));
        assert_eq!(params.len(), 6);
        assert_eq!(params[4], ("oauth_token".to_string(), "AT".to_string()));
        assert_eq!(params[5], ("oauth_signature".to_string(), "csecret&AS".to_string()));
    }

    #[test]
    fn test_parse_request_token() {
        let result = RequestTokenResult::parse(
            "oauth_token=T&oauth_token_secret=S&oauth_callback_confirmed=true",
        )
        .unwrap();
        assert_eq!(result.token, "T");
        assert_eq!(result.secret, "S");
        assert!(result.callback_confirmed);
    }

    #[test]
    fn test_parse_blank_body_fails() {
        let err = RequestTokenResult::parse("  \n").unwrap_err();
        assert!(err.is_authentication());
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_parse_missing_secret_fails() {
        let err = AccessTokenResult::parse("oauth_token=AT").unwrap_err();
        assert!(err.is_authentication());
        assert!(err.to_string().contains("oauth_token_secret"));
    }

    #[test]
    fn test_parse_html_body_fails() {
        assert!(AccessTokenResult::parse("<html>Invalid consumer.</html>").is_err());
    }

    #[test]
    fn test_authorize_url_escapes_token() {
        let manager = OAuthManager::new(
            reqwest::Client::new(),
            OAuthSettings {
                endpoints: OAuthEndpoints::for_testing("http://provider.test"),
                ..OAuthSettings::new(consumer())
            },
        );
        assert_eq!(
            manager.authorize_url("a b&c"),
            "http://provider.test/oauth/authorize?oauth_token=a+b%26c"
        );
    }

    #[test]
    fn test_results_debug_redacts() {
        let access = AccessTokenResult {
            access_token: "secret-access".into(),
            access_token_secret: "secret-access-secret".into(),
        };
        assert!(!format!("{access:?}").contains("secret-access"));
    }
}
