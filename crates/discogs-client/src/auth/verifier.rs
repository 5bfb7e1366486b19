//! Call-site authorization check run before every API operation.
//!
//! Each operation declares its [`AuthRequirement`] once, in
//! [`crate::operations`]. The connection hands that declaration to
//! [`verify_before_call`] right before dispatch.

use serde::{Deserialize, Serialize};

use super::manager::CredentialManager;
use crate::error::{AuthError, AuthResult};
use crate::operations;

/// Whether an operation needs credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthRequirement {
    /// Fails without credentials.
    Required,
    /// Works anonymously but returns more with credentials.
    Optional,
    /// Public.
    #[default]
    None,
}

/// An API operation and its declared requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiOperation {
    /// API surface the operation belongs to, e.g. `Database`.
    pub resource: &'static str,
    /// Operation name, e.g. `search`.
    pub name: &'static str,
    pub requirement: AuthRequirement,
}

impl ApiOperation {
    #[must_use]
    pub const fn new(resource: &'static str, name: &'static str, requirement: AuthRequirement) -> Self {
        Self { resource, name, requirement }
    }
}

impl std::fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource, self.name)
    }
}

/// Decide whether `operation` may proceed given the authentication state.
///
/// # Errors
///
/// Returns [`AuthError::Authorization`] for a `Required` operation when
/// `authenticated` is false.
pub fn verify(operation: &ApiOperation, authenticated: bool) -> AuthResult<()> {
    if authenticated {
        return Ok(());
    }
    match operation.requirement {
        AuthRequirement::None => Ok(()),
        AuthRequirement::Optional => {
            tracing::info!(
                resource = operation.resource,
                operation = operation.name,
                "Calling without credentials, results may be limited"
            );
            Ok(())
        }
        AuthRequirement::Required => {
            Err(AuthError::authorization(operation.resource, operation.name))
        }
    }
}

/// [`verify`] against the credential manager's current state.
pub fn verify_before_call(
    operation: &ApiOperation,
    credentials: &dyn CredentialManager,
) -> AuthResult<()> {
    verify(operation, credentials.is_authenticated())
}

/// [`verify_before_call`] for an operation looked up by name.
///
/// Unknown operations are treated as public.
pub fn verify_named(
    resource: &str,
    name: &str,
    credentials: &dyn CredentialManager,
) -> AuthResult<()> {
    match operations::find(resource, name) {
        Some(operation) => verify_before_call(operation, credentials),
        None => {
            tracing::debug!(resource, operation = name, "No declared requirement, allowing call");
            Ok(())
        }
    }
}
