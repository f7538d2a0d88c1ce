//! Driving port for reading generations.

use async_trait::async_trait;

use crate::domain::{Error, Generation, RecentLimit, UserId};

/// Generation read use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationQuery: Send + Sync {
    /// The user's most recent generations, newest first.
    async fn recent(&self, user_id: &UserId, limit: RecentLimit) -> Result<Vec<Generation>, Error>;
}
