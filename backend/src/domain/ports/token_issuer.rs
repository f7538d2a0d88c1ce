//! Driven port for bearer token signing and verification.

use crate::domain::{AccessToken, TokenClaims, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token is malformed, tampered with or signed with another key.
        Invalid { message: String } => "token invalid: {message}",
        /// The token is past its expiry.
        Expired => "token expired",
        /// Signing failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and verifies access tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `user`.
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError>;

    /// Verify an encoded token and recover its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
