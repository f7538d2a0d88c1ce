//! Driven port for password hashing.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing or verifying passwords.
    pub enum PasswordHashError {
        /// The hashing backend failed.
        Backend { message: String } => "password hashing failed: {message}",
    }
}

/// One-way password hashing.
///
/// Implementations may be CPU heavy; async lets adapters move the work off
/// the request thread.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` for storage.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a stored `hash`.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
