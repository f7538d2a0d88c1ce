//! Driven port for account persistence.

use async_trait::async_trait;

use crate::domain::{Email, UserAccount};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// An account with this email already exists.
        DuplicateEmail { email: String } => "user with email {email} already exists",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Storage for accounts keyed by normalised email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with
    /// [`UserPersistenceError::DuplicateEmail`] when the email is taken.
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Look an account up by email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<UserAccount>, UserPersistenceError>;
}
