//! Driven port for generation records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Generation, GenerationId, GenerationStatus, RecentLimit, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by generation repository adapters.
    pub enum GenerationPersistenceError {
        /// No record with this id belongs to the user.
        NotFound { id: String } => "generation {id} not found",
        /// Repository connection could not be established.
        Connection { message: String } => "generation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "generation repository query failed: {message}",
    }
}

/// Terminal outcome written back to a pending record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcomeUpdate {
    /// New status.
    pub status: GenerationStatus,
    /// Rendered image URL, present for completed records.
    pub generated_image_url: Option<String>,
    /// Timestamp of the transition.
    pub updated_at: DateTime<Utc>,
}

/// Storage for generation records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationRepository: Send + Sync {
    /// Insert a record.
    async fn insert(&self, generation: &Generation) -> Result<(), GenerationPersistenceError>;

    /// Apply `update` to the record owned by `user_id` and return the result.
    async fn update_outcome(
        &self,
        id: &GenerationId,
        user_id: &UserId,
        update: GenerationOutcomeUpdate,
    ) -> Result<Generation, GenerationPersistenceError>;

    /// The user's records, newest first, at most `limit`.
    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: RecentLimit,
    ) -> Result<Vec<Generation>, GenerationPersistenceError>;
}
