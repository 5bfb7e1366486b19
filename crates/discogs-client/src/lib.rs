//! Discogs API client
//!
//! An async client for the Discogs music database with pluggable authentication.
//!
//! # Features
//!
//! - **Four credential schemes**: anonymous, consumer key/secret, personal token, OAuth 1.0a
//! - **OAuth 1.0a handshake**: PLAINTEXT signing with a loopback redirect receiver,
//!   run once per client and shared by concurrent callers
//! - **Authorization checks**: every operation declares whether it needs credentials
//!   and fails fast before sending a request that cannot succeed
//! - **Rate-limited**: Respects Discogs API limits, with retries on transient failures
//!
//! # Example
//!
//! ```no_run
//! use discogs_client::{DiscogsClient, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = DiscogsClient::new(config)?;
//!
//!     let release = client.get_release(249_504).await?;
//!     println!("{}", release.title);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod operations;

pub use auth::{CredentialInfo, CredentialManager};
pub use client::DiscogsClient;
pub use config::{AuthConfig, Config};
pub use error::{AuthError, ClientError};
