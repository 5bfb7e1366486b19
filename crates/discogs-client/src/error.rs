//! Error types for the Discogs client.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the authentication layer.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// Credential material or receiver settings rejected at construction time.
    #[error("Validation error: {field} {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// OAuth handshake failed (bad status, unparsable body, protocol violation).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// What went wrong
        message: String,
    },

    /// Transport failure talking to an OAuth endpoint.
    #[error("Authentication failed: HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The user declined the authorization request in the browser.
    #[error("Authorization denied by user: {reason}")]
    Denied {
        /// Error or denial parameter from the redirect
        reason: String,
    },

    /// No redirect arrived before the wait expired.
    #[error("Timed out after {0:?} waiting for the OAuth redirect")]
    CallbackTimeout(Duration),

    /// The local redirect receiver could not be bound or stopped.
    #[error("Redirect receiver error: {0}")]
    Receiver(String),

    /// An operation that requires credentials was invoked without them.
    #[error("{resource}.{operation} requires authentication, but no credentials are configured")]
    Authorization {
        /// API resource (e.g. "Database")
        resource: String,
        /// Operation name (e.g. "search")
        operation: String,
    },
}

impl AuthError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication { message: message.into() }
    }

    /// Create a denied error.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied { reason: reason.into() }
    }

    /// Create a receiver error.
    #[must_use]
    pub fn receiver(message: impl Into<String>) -> Self {
        Self::Receiver(message.into())
    }

    /// Create an authorization error for a resource operation.
    #[must_use]
    pub fn authorization(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Authorization { resource: resource.into(), operation: operation.into() }
    }

    /// Returns true if this error aborted an OAuth handshake.
    ///
    /// A later credential request retries the handshake from the first step.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::Http(_)
                | Self::Denied { .. }
                | Self::CallbackTimeout(_)
                | Self::Receiver(_)
        )
    }

    /// Returns true if this error came from invalid caller-supplied settings.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true if this error was raised by the call-site verifier.
    #[must_use]
    pub const fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }
}

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Credential resolution or call-site verification failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Rate limited by the Discogs API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Credentials rejected by the server (401/403 response)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(status: u16, message: impl Into<String>) -> Self {
        Self::Unauthorized { status, message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// The authentication-layer error, if this failure came from it.
    #[must_use]
    pub const fn as_auth(&self) -> Option<&AuthError> {
        match self {
            Self::Auth(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
