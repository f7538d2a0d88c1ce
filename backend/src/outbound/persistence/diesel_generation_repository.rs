//! PostgreSQL-backed `GenerationRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    GenerationOutcomeUpdate, GenerationPersistenceError, GenerationRepository,
};
use crate::domain::{Generation, GenerationId, GenerationStatus, RecentLimit, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{GenerationOutcomeChangeset, GenerationRow, NewGenerationRow};
use super::pool::{DbPool, PoolError};
use super::schema::generations;

/// Diesel implementation of [`GenerationRepository`].
#[derive(Clone)]
pub struct DieselGenerationRepository {
    pool: DbPool,
}

impl DieselGenerationRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GenerationPersistenceError {
    GenerationPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> GenerationPersistenceError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => GenerationPersistenceError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            GenerationPersistenceError::query("duplicate generation id")
        }
        DieselFailure::NotFound => GenerationPersistenceError::query("record not found"),
        DieselFailure::Query(message) => GenerationPersistenceError::query(message),
    }
}

fn row_to_generation(row: GenerationRow) -> Generation {
    let status = row.status.parse().unwrap_or_else(|err: String| {
        warn!(generation_id = %row.id, %err, "unrecognised status, treating as failed");
        GenerationStatus::Failed
    });
    Generation {
        id: GenerationId::from(row.id),
        user_id: UserId::from(row.user_id),
        prompt: row.prompt,
        style: row.style,
        original_image_url: row.original_image_url,
        generated_image_url: row.generated_image_url,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl GenerationRepository for DieselGenerationRepository {
    async fn insert(&self, generation: &Generation) -> Result<(), GenerationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewGenerationRow {
            id: *generation.id.as_uuid(),
            user_id: *generation.user_id.as_uuid(),
            prompt: generation.prompt.as_str(),
            style: generation.style.as_str(),
            original_image_url: generation.original_image_url.as_str(),
            generated_image_url: generation.generated_image_url.as_deref(),
            status: generation.status.as_str(),
            created_at: generation.created_at,
            updated_at: generation.updated_at,
        };

        diesel::insert_into(generations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert generation"))?;
        Ok(())
    }

    async fn update_outcome(
        &self,
        id: &GenerationId,
        user_id: &UserId,
        update: GenerationOutcomeUpdate,
    ) -> Result<Generation, GenerationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = GenerationOutcomeChangeset {
            status: update.status.as_str(),
            generated_image_url: update.generated_image_url.as_deref(),
            updated_at: update.updated_at,
        };

        let row = diesel::update(
            generations::table
                .filter(generations::id.eq(*id.as_uuid()))
                .filter(generations::user_id.eq(*user_id.as_uuid())),
        )
        .set(&changes)
        .returning(GenerationRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "update generation outcome"))?;

        row.map(row_to_generation)
            .ok_or_else(|| GenerationPersistenceError::not_found(id.to_string()))
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: RecentLimit,
    ) -> Result<Vec<Generation>, GenerationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GenerationRow> = generations::table
            .filter(generations::user_id.eq(*user_id.as_uuid()))
            .order((generations::created_at.desc(), generations::id.desc()))
            .limit(i64::from(limit.get()))
            .select(GenerationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list recent generations"))?;

        Ok(rows.into_iter().map(row_to_generation).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    fn row(status: &str) -> GenerationRow {
        GenerationRow {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            prompt: "p".to_owned(),
            style: "s".to_owned(),
            original_image_url: "/uploads/a.png".to_owned(),
            generated_image_url: None,
            status: status.to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("pending", GenerationStatus::Pending)]
    #[case("completed", GenerationStatus::Completed)]
    #[case("failed", GenerationStatus::Failed)]
    #[case("exploded", GenerationStatus::Failed)]
    fn rows_map_status(#[case] raw: &str, #[case] expected: GenerationStatus) {
        assert_eq!(row_to_generation(row(raw)).status, expected);
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(String::from("closed")),
        );
        assert!(matches!(
            map_diesel_error(error, "select"),
            GenerationPersistenceError::Connection { .. }
        ));
    }
}
