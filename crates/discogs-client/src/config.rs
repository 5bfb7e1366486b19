//! Configuration for the Discogs client.

use std::time::Duration;

use anyhow::Context;

use crate::auth::{KeySecret, OAuthSettings, OAuthToken, PersonalToken, ReceiverConfig};
use crate::error::AuthError;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Discogs API.
    pub const BASE_URL: &str = "https://api.discogs.com";

    /// OAuth 1.0a request token endpoint (GET).
    pub const REQUEST_TOKEN_URL: &str = "https://api.discogs.com/oauth/request_token";

    /// OAuth 1.0a user authorization page (opened in the browser).
    pub const AUTHORIZE_URL: &str = "https://www.discogs.com/oauth/authorize";

    /// OAuth 1.0a access token endpoint (POST).
    pub const ACCESS_TOKEN_URL: &str = "https://api.discogs.com/oauth/access_token";

    /// Discogs rejects requests without a User-Agent.
    pub const USER_AGENT: &str = concat!("discogs-client-rs/", env!("CARGO_PKG_VERSION"));

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Delay between unauthenticated requests (25 req/min).
    pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(2400);

    /// Delay between authenticated requests (60 req/min).
    pub const RATE_LIMIT_DELAY_AUTHENTICATED: Duration = Duration::from_secs(1);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Host the redirect receiver binds and advertises.
    pub const CALLBACK_HOST: &str = "localhost";

    /// Port the redirect receiver binds by default.
    pub const CALLBACK_PORT: u16 = 8484;

    /// Route the redirect receiver serves.
    pub const CALLBACK_PATH: &str = "/Callback";

    /// How long the handshake waits for the browser redirect.
    pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);
}

/// How outgoing requests are authenticated.
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// Anonymous access.
    #[default]
    None,
    /// `Authorization: Discogs key=.., secret=..`
    KeySecret(KeySecret),
    /// `Authorization: Discogs token=..`
    Token(PersonalToken),
    /// OAuth 1.0a, with the handshake run on first use unless a token is supplied.
    OAuth(OAuthSettings),
}

impl AuthConfig {
    /// True for every mode except `None`.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Scheme name, matching the credential snapshot discriminator.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::KeySecret(_) => "key_secret",
            Self::Token(_) => "token",
            Self::OAuth(_) => "oauth",
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the API (for testing with mock servers).
    pub base_url: String,

    /// User-Agent sent with every request.
    pub user_agent: String,

    /// Authentication mode.
    pub auth: AuthConfig,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Delay before each request.
    pub rate_limit_delay: Duration,
}

impl Config {
    /// Create a new configuration for the given authentication mode.
    ///
    /// The rate limit is relaxed when credentials are configured.
    #[must_use]
    pub fn new(auth: AuthConfig) -> Self {
        let rate_limit_delay = if auth.has_credentials() {
            api::RATE_LIMIT_DELAY_AUTHENTICATED
        } else {
            api::RATE_LIMIT_DELAY
        };
        Self {
            base_url: api::BASE_URL.to_string(),
            user_agent: api::USER_AGENT.to_string(),
            auth,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_delay,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: api::USER_AGENT.to_string(),
            auth: AuthConfig::None,
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_delay: Duration::ZERO,
        }
    }

    /// Replace the authentication mode, keeping everything else.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// | Variable | Effect |
    /// |---|---|
    /// | `DISCOGS_TOKEN` | personal token (wins over key/secret) |
    /// | `DISCOGS_KEY`, `DISCOGS_SECRET` | consumer key and secret |
    /// | `DISCOGS_OAUTH` | `1`/`true`: use the key/secret as OAuth consumer |
    /// | `DISCOGS_OAUTH_TOKEN`, `DISCOGS_OAUTH_TOKEN_SECRET` | previously obtained access token |
    /// | `DISCOGS_CALLBACK_PORT` | redirect receiver port |
    /// | `DISCOGS_USER_AGENT` | User-Agent override |
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but invalid (blank secret, bad port).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let auth = if let Some(token) = var("DISCOGS_TOKEN") {
            AuthConfig::Token(PersonalToken::new(token)?)
        } else {
            match (var("DISCOGS_KEY"), var("DISCOGS_SECRET")) {
                (Some(key), Some(secret)) => {
                    let consumer = KeySecret::new(key, secret)?;
                    if var("DISCOGS_OAUTH").is_some_and(|v| is_truthy(&v)) {
                        AuthConfig::OAuth(oauth_settings(consumer, &var)?)
                    } else {
                        AuthConfig::KeySecret(consumer)
                    }
                }
                (Some(_), None) => {
                    return Err(AuthError::validation("DISCOGS_SECRET", "must be set with DISCOGS_KEY").into());
                }
                (None, Some(_)) => {
                    return Err(AuthError::validation("DISCOGS_KEY", "must be set with DISCOGS_SECRET").into());
                }
                (None, None) => AuthConfig::None,
            }
        };

        let mut config = Self::new(auth);
        if let Some(user_agent) = var("DISCOGS_USER_AGENT") {
            config.user_agent = user_agent;
        }
        Ok(config)
    }

    /// Check if credentials are configured.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.auth.has_credentials()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(AuthConfig::None)
    }
}

fn oauth_settings(
    consumer: KeySecret,
    var: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<OAuthSettings> {
    let mut settings = OAuthSettings::new(consumer);

    match (var("DISCOGS_OAUTH_TOKEN"), var("DISCOGS_OAUTH_TOKEN_SECRET")) {
        (Some(token), Some(secret)) => settings.token = Some(OAuthToken::new(token, secret)?),
        (None, None) => {}
        _ => {
            return Err(AuthError::validation(
                "DISCOGS_OAUTH_TOKEN",
                "and DISCOGS_OAUTH_TOKEN_SECRET must be set together",
            )
            .into());
        }
    }

    if let Some(port) = var("DISCOGS_CALLBACK_PORT") {
        let port: u32 = port
            .trim()
            .parse()
            .with_context(|| format!("DISCOGS_CALLBACK_PORT is not a number: {port}"))?;
        settings.receiver = ReceiverConfig::new(port)?;
    }

    Ok(settings)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
