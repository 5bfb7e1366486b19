//! Loopback HTTP listener that captures a single OAuth redirect.
//!
//! The provider redirects the user's browser to
//! `http://<host>:<port><callback_path>?oauth_token=..&oauth_verifier=..`
//! once access is granted, or with `error`/`denied` when it is not. The
//! first redirect settles the outcome; the waiting caller is released and
//! the browser gets a landing page either way.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use super::landing;
use crate::config::api;
use crate::error::{AuthError, AuthResult};

/// How long `stop()` waits for in-flight connections before aborting the server task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Validate a TCP port number.
pub fn validate_port(port: u32) -> AuthResult<u16> {
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(AuthError::validation("port", format!("{port} is outside 1-65535"))),
    }
}

/// Where the receiver listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    host: String,
    port: u16,
    callback_path: String,
}

impl ReceiverConfig {
    /// Receiver on `localhost` at the default callback path.
    pub fn new(port: u32) -> AuthResult<Self> {
        Ok(Self {
            host: api::CALLBACK_HOST.to_string(),
            port: validate_port(port)?,
            callback_path: api::CALLBACK_PATH.to_string(),
        })
    }

    /// Override the host name (e.g. `127.0.0.1`).
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the callback path. A leading `/` is added if missing.
    #[must_use]
    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.callback_path = if path.starts_with('/') { path } else { format!("/{path}") };
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// `http://<host>:<port><callback_path>`
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.callback_path)
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            host: api::CALLBACK_HOST.to_string(),
            port: api::CALLBACK_PORT,
            callback_path: api::CALLBACK_PATH.to_string(),
        }
    }
}

/// Result of the redirect, shared between the route handler and waiters.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Pending,
    Verifier(String),
    Denied(String),
    MissingVerifier,
    Stopped,
}

impl Outcome {
    fn resolve(self) -> AuthResult<Option<String>> {
        match self {
            Self::Verifier(code) => Ok(Some(code)),
            Self::Denied(reason) => Err(AuthError::denied(reason)),
            Self::MissingVerifier => {
                Err(AuthError::authentication("redirect did not carry an oauth_verifier"))
            }
            Self::Pending | Self::Stopped => Ok(None),
        }
    }
}

struct RunningServer {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Ephemeral redirect listener for one OAuth handshake attempt.
pub struct LocalRedirectReceiver {
    config: ReceiverConfig,
    outcome: Arc<watch::Sender<Outcome>>,
    server: Mutex<Option<RunningServer>>,
}

impl LocalRedirectReceiver {
    #[must_use]
    pub fn new(config: ReceiverConfig) -> Self {
        let (outcome, _) = watch::channel(Outcome::Pending);
        Self { config, outcome: Arc::new(outcome), server: Mutex::new(None) }
    }

    #[must_use]
    pub const fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Callback URL to hand to the provider as `oauth_callback`.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        self.config.redirect_uri()
    }

    /// Bind the listener and start serving the callback route.
    ///
    /// Always clears the previous outcome; the listener is only bound if not
    /// already running.
    pub async fn start(&self) -> AuthResult<()> {
        let mut server = self.server.lock().await;
        self.outcome.send_replace(Outcome::Pending);
        if server.is_some() {
            tracing::debug!(port = self.config.port, "Redirect receiver already running");
            return Ok(());
        }

        let listener = tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| {
                AuthError::receiver(format!(
                    "failed to bind {}:{}: {e}",
                    self.config.host, self.config.port
                ))
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AuthError::receiver(format!("failed to read listener address: {e}")))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = self.router();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "Redirect receiver stopped with error");
            }
        });

        tracing::info!(addr = %local_addr, redirect_uri = %self.redirect_uri(), "Redirect receiver listening");

        *server = Some(RunningServer { shutdown: Some(shutdown_tx), task, local_addr });
        Ok(())
    }

    /// True while the listener is bound.
    pub async fn is_running(&self) -> bool {
        self.server.lock().await.is_some()
    }

    /// Wait for the redirect.
    ///
    /// Returns the verifier code, `None` if [`stop`](Self::stop) was called first, or an
    /// error if the redirect reported a failure.
    pub async fn wait_for_code(&self) -> AuthResult<Option<String>> {
        let mut rx = self.outcome.subscribe();
        let outcome = rx
            .wait_for(|outcome| *outcome != Outcome::Pending)
            .await
            .map_err(|_| AuthError::receiver("redirect receiver closed"))?
            .clone();
        outcome.resolve()
    }

    /// [`wait_for_code`](Self::wait_for_code) bounded by `timeout`.
    pub async fn wait_for_code_timeout(&self, timeout: Duration) -> AuthResult<Option<String>> {
        tokio::time::timeout(timeout, self.wait_for_code())
            .await
            .map_err(|_| AuthError::CallbackTimeout(timeout))?
    }

    /// Release any waiter and shut the listener down, freeing the port.
    ///
    /// Safe to call repeatedly and before [`start`](Self::start).
    pub async fn stop(&self) {
        self.outcome.send_if_modified(|outcome| {
            if *outcome == Outcome::Pending {
                *outcome = Outcome::Stopped;
                true
            } else {
                false
            }
        });

        let running = self.server.lock().await.take();
        let Some(mut running) = running else {
            return;
        };

        if let Some(tx) = running.shutdown.take() {
            let _ = tx.send(());
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut running.task).await.is_err() {
            tracing::warn!(addr = %running.local_addr, "Redirect receiver did not drain in time, aborting");
            running.task.abort();
        }
        tracing::info!(addr = %running.local_addr, "Redirect receiver stopped");
    }

    /// Router serving the callback route, bound to this receiver's outcome.
    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.config.callback_path, get(handle_callback))
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.outcome))
    }
}

impl std::fmt::Debug for LocalRedirectReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRedirectReceiver").field("redirect_uri", &self.redirect_uri()).finish()
    }
}

/// Query parameters on the redirect.
#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    oauth_token: Option<String>,
    oauth_verifier: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    denied: Option<String>,
}

async fn handle_callback(
    State(outcome): State<Arc<watch::Sender<Outcome>>>,
    Query(params): Query<CallbackParams>,
) -> Html<String> {
    tracing::debug!(
        has_token = params.oauth_token.is_some(),
        has_verifier = params.oauth_verifier.is_some(),
        has_error = params.error.is_some() || params.denied.is_some(),
        "Received OAuth redirect"
    );

    let (next, page) = if let Some(error) = params.error {
        let reason = match params.error_description {
            Some(description) => format!("{error}: {description}"),
            None => error,
        };
        tracing::warn!(reason = %reason, "OAuth redirect reported an error");
        let page = landing::render_failure(&reason);
        (Outcome::Denied(reason), page)
    } else if params.denied.is_some() {
        tracing::warn!("User denied the OAuth authorization request");
        let reason = "access denied".to_string();
        let page = landing::render_failure(&reason);
        (Outcome::Denied(reason), page)
    } else if let Some(verifier) = params.oauth_verifier.filter(|v| !v.trim().is_empty()) {
        tracing::info!("OAuth redirect carried a verifier");
        (Outcome::Verifier(verifier), landing::render_success())
    } else {
        tracing::warn!("OAuth redirect missing oauth_verifier");
        (Outcome::MissingVerifier, landing::render_failure("No verifier code was provided."))
    };

    let settled = outcome.send_if_modified(move |current| {
        if *current == Outcome::Pending {
            *current = next;
            true
        } else {
            false
        }
    });
    if !settled {
        tracing::debug!("Ignoring redirect, outcome already settled");
    }

    Html(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port_range() {
        assert_eq!(validate_port(1).unwrap(), 1);
        assert_eq!(validate_port(65535).unwrap(), 65535);
        assert!(validate_port(0).unwrap_err().is_validation());
        assert!(validate_port(65536).unwrap_err().is_validation());
    }

    #[test]
    fn test_redirect_uri_defaults() {
        let config = ReceiverConfig::new(9000).unwrap();
        assert_eq!(config.redirect_uri(), "http://localhost:9000/Callback");
    }

    #[test]
    fn test_callback_path_gets_leading_slash() {
        let config = ReceiverConfig::new(9000).unwrap().with_callback_path("oauth/done");
        assert_eq!(config.callback_path(), "/oauth/done");
    }

    #[test]
    fn test_outcome_resolution() {
        assert_eq!(Outcome::Verifier("V".into()).resolve().unwrap(), Some("V".to_string()));
        assert_eq!(Outcome::Stopped.resolve().unwrap(), None);
        assert!(Outcome::Denied("nope".into()).resolve().unwrap_err().is_authentication());
        assert!(Outcome::MissingVerifier.resolve().unwrap_err().is_authentication());
    }
}
