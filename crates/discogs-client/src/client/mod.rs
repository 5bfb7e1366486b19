//! Discogs API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Rate limiting (slower without credentials)
//! - Per-operation authorization check before dispatch
//! - Credential decoration for every scheme (key/secret, token, OAuth 1.0a)

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;

use crate::auth::{self, ApiOperation, CredentialInfo, CredentialManager, url_escape};
use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Artist, CollectionFolder, CollectionFolders, Identity, Release, SearchResults, UserProfile,
};
use crate::operations;

/// Media type requesting the v2 JSON representation.
const ACCEPT: &str = "application/vnd.discogs.v2.discogs+json";

/// Discogs API client.
#[derive(Clone)]
pub struct DiscogsClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Signs outgoing requests.
    credentials: Arc<dyn CredentialManager>,

    /// API base URL.
    base_url: String,

    /// Delay before each request.
    rate_limit_delay: Duration,
}

impl DiscogsClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, reqwest::header::HeaderValue::from_static(ACCEPT));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        // The OAuth handshake talks to the provider without retries.
        let credentials = auth::credential_manager(&config.auth, http.clone());

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(3);

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        tracing::debug!(
            base_url = %config.base_url,
            scheme = config.auth.scheme(),
            "Created Discogs client"
        );

        Ok(Self {
            client,
            credentials,
            base_url: config.base_url,
            rate_limit_delay: config.rate_limit_delay,
        })
    }

    /// Replace the credential manager.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialManager>) -> Self {
        self.credentials = credentials;
        self
    }

    /// The credential manager signing requests.
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialManager> {
        &self.credentials
    }

    /// Check if credentials are configured.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    /// The credential requests are signed with, running the OAuth handshake if needed.
    pub async fn credential(&self) -> ClientResult<CredentialInfo> {
        Ok(self.credentials.current_credential().await?)
    }

    /// Undecorated request to a path under the API base URL.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Attach the configured credentials to a request.
    pub async fn decorate(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        Ok(self.credentials.decorate(request).await?)
    }

    /// Get the account the credentials belong to.
    ///
    /// # Errors
    ///
    /// Returns error without credentials or on API failure.
    pub async fn get_identity(&self) -> ClientResult<Identity> {
        self.get(&operations::GET_IDENTITY, "/oauth/identity", &[]).await
    }

    /// Get a release by ID.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_release(&self, release_id: u64) -> ClientResult<Release> {
        self.get(&operations::GET_RELEASE, &format!("/releases/{release_id}"), &[]).await
    }

    /// Get an artist by ID.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_artist(&self, artist_id: u64) -> ClientResult<Artist> {
        self.get(&operations::GET_ARTIST, &format!("/artists/{artist_id}"), &[]).await
    }

    /// Search the database.
    ///
    /// `kind` narrows results to `release`, `master`, `artist` or `label`.
    ///
    /// # Errors
    ///
    /// Returns error without credentials or on API failure.
    pub async fn search(
        &self,
        query: &str,
        kind: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> ClientResult<SearchResults> {
        let mut params = vec![
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(kind) = kind {
            params.push(("type", kind.to_string()));
        }

        self.get(&operations::SEARCH, "/database/search", &params).await
    }

    /// Get a user profile.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_profile(&self, username: &str) -> ClientResult<UserProfile> {
        let path = format!("/users/{}", url_escape(username));
        self.get(&operations::GET_PROFILE, &path, &[]).await
    }

    /// List a user's collection folders.
    ///
    /// Anonymous callers only see public folders.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_folders(&self, username: &str) -> ClientResult<Vec<CollectionFolder>> {
        let path = format!("/users/{}/collection/folders", url_escape(username));
        let folders: CollectionFolders = self.get(&operations::GET_FOLDERS, &path, &[]).await?;
        Ok(folders.folders)
    }

    /// Make a GET request for an operation.
    async fn get<T>(
        &self,
        operation: &ApiOperation,
        path: &str,
        params: &[(&str, String)],
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        auth::verify_before_call(operation, self.credentials.as_ref())?;

        // Rate limit
        tokio::time::sleep(self.rate_limit_delay).await;

        let request = self.request(Method::GET, path).query(params);
        let request = self.decorate(request).await?;

        tracing::debug!(operation = %operation, path, "Sending request");
        let response = request.send().await?;

        let response = self.handle_response(response, path).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
        path: &str,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::debug!(status = status.as_u16(), path, "Request failed");

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            401 | 403 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::unauthorized(status.as_u16(), error_message(&text)))
            }
            404 => Err(ClientError::not_found(path)),
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(error_message(&text)))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), error_message(&text)))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

impl std::fmt::Debug for DiscogsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscogsClient")
            .field("base_url", &self.base_url)
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Discogs error bodies look like `{"message": "..."}`.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body).map_or_else(|_| body.trim().to_string(), |e| e.message)
}
