//! Driving port for signup, login and token authentication.
//!
//! Inbound adapters call this port without knowing how accounts are stored
//! or how tokens are signed, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{AuthSession, Credentials, Error, TokenClaims};

/// Account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and return a session for it.
    async fn signup(&self, credentials: &Credentials) -> Result<AuthSession, Error>;

    /// Check credentials and return a session.
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, Error>;

    /// Verify a bearer token.
    fn authenticate(&self, token: &str) -> Result<TokenClaims, Error>;
}
