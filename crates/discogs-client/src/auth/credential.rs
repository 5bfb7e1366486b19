//! Credential value types.
//!
//! Every secret-carrying type validates its material on construction (including
//! deserialization) and redacts it from `Debug`/`Display`. Serialization keeps the
//! real values so a snapshot can be stored by the caller and loaded back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Placeholder printed in place of secret material.
pub const REDACTED: &str = "<redacted>";

fn non_blank(field: &str, value: String) -> AuthResult<String> {
    if value.trim().is_empty() {
        return Err(AuthError::validation(field, "must not be blank"));
    }
    Ok(value)
}

/// Consumer key and secret issued to a registered application.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KeySecretFields")]
pub struct KeySecret {
    key: String,
    secret: String,
}

#[derive(Deserialize)]
struct KeySecretFields {
    key: String,
    secret: String,
}

impl TryFrom<KeySecretFields> for KeySecret {
    type Error = AuthError;

    fn try_from(fields: KeySecretFields) -> AuthResult<Self> {
        Self::new(fields.key, fields.secret)
    }
}

impl KeySecret {
    /// Validate and wrap a consumer key and secret.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> AuthResult<Self> {
        Ok(Self { key: non_blank("key", key.into())?, secret: non_blank("secret", secret.into())? })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for KeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySecret").field("key", &self.key).field("secret", &REDACTED).finish()
    }
}

/// Personal access token generated from the user's developer settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersonalTokenFields")]
pub struct PersonalToken {
    value: String,
}

#[derive(Deserialize)]
struct PersonalTokenFields {
    value: String,
}

impl TryFrom<PersonalTokenFields> for PersonalToken {
    type Error = AuthError;

    fn try_from(fields: PersonalTokenFields) -> AuthResult<Self> {
        Self::new(fields.value)
    }
}

impl PersonalToken {
    pub fn new(value: impl Into<String>) -> AuthResult<Self> {
        Ok(Self { value: non_blank("token", value.into())? })
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for PersonalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonalToken").field("value", &REDACTED).finish()
    }
}

/// OAuth 1.0a access token and token secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OAuthTokenFields")]
pub struct OAuthToken {
    token: String,
    secret: String,
}

#[derive(Deserialize)]
struct OAuthTokenFields {
    token: String,
    secret: String,
}

impl TryFrom<OAuthTokenFields> for OAuthToken {
    type Error = AuthError;

    fn try_from(fields: OAuthTokenFields) -> AuthResult<Self> {
        Self::new(fields.token, fields.secret)
    }
}

impl OAuthToken {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> AuthResult<Self> {
        Ok(Self {
            token: non_blank("oauth_token", token.into())?,
            secret: non_blank("oauth_token_secret", secret.into())?,
        })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken").field("token", &REDACTED).field("secret", &REDACTED).finish()
    }
}

/// The credential a client authenticates with.
///
/// Serializes to a JSON object with a `type` discriminator:
///
/// ```
/// use discogs_client::auth::CredentialInfo;
///
/// let credential = CredentialInfo::token("my-token").unwrap();
/// let snapshot = credential.to_snapshot().unwrap();
/// assert_eq!(snapshot, r#"{"type":"token","value":"my-token"}"#);
/// assert_eq!(CredentialInfo::from_snapshot(&snapshot).unwrap(), credential);
/// assert!(!format!("{credential:?}").contains("my-token"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialInfo {
    /// Anonymous access.
    #[default]
    None,
    /// Application consumer key and secret.
    KeySecret(KeySecret),
    /// Personal access token.
    Token(PersonalToken),
    /// OAuth 1.0a access token.
    #[serde(rename = "oauth")]
    OAuth(OAuthToken),
}

impl CredentialInfo {
    pub fn key_secret(key: impl Into<String>, secret: impl Into<String>) -> AuthResult<Self> {
        KeySecret::new(key, secret).map(Self::KeySecret)
    }

    pub fn token(value: impl Into<String>) -> AuthResult<Self> {
        PersonalToken::new(value).map(Self::Token)
    }

    pub fn oauth(token: impl Into<String>, secret: impl Into<String>) -> AuthResult<Self> {
        OAuthToken::new(token, secret).map(Self::OAuth)
    }

    /// Scheme name, matching the snapshot discriminator.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::KeySecret(_) => "key_secret",
            Self::Token(_) => "token",
            Self::OAuth(_) => "oauth",
        }
    }

    /// True for every scheme except `None`.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Serialize to the compact JSON snapshot form, secrets included.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot produced by [`to_snapshot`](Self::to_snapshot).
    pub fn from_snapshot(snapshot: &str) -> AuthResult<Self> {
        serde_json::from_str(snapshot)
            .map_err(|e| AuthError::validation("credential snapshot", e.to_string()))
    }
}

impl fmt::Display for CredentialInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::KeySecret(ks) => write!(f, "key_secret(key={}, secret={REDACTED})", ks.key),
            Self::Token(_) => write!(f, "token({REDACTED})"),
            Self::OAuth(_) => write!(f, "oauth(token={REDACTED}, secret={REDACTED})"),
        }
    }
}
