//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserAccount, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &str,
    email: &Email,
) -> UserPersistenceError {
    match classify_diesel_error(error, operation) {
        DieselFailure::UniqueViolation { .. } => {
            UserPersistenceError::duplicate_email(email.as_ref())
        }
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::NotFound => UserPersistenceError::query("record not found"),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let email = Email::new(&row.email).map_err(|err| {
        warn!(user_id = %row.id, %err, "stored email failed validation");
        UserPersistenceError::query(format!("stored email invalid: {err}"))
    })?;
    Ok(UserAccount {
        user: User::new(UserId::from(row.id), email),
        password_hash: row.password_hash,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email = account.user.email();
        let row = NewUserRow {
            id: *account.user.id().as_uuid(),
            email: email.as_ref(),
            password_hash: account.password_hash.as_str(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert user", email))?;
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user by email", email))?;

        row.map(row_to_account).transpose()
    }
}
