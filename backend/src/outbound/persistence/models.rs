//! Internal Diesel row structs.
//!
//! These types stay inside the persistence layer; repositories convert them
//! to domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{generations, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Insertable `users` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Row read from `generations`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = generations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GenerationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub style: String,
    pub original_image_url: String,
    pub generated_image_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable `generations` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = generations)]
pub(crate) struct NewGenerationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: &'a str,
    pub style: &'a str,
    pub original_image_url: &'a str,
    pub generated_image_url: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Terminal status change for a generation.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = generations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GenerationOutcomeChangeset<'a> {
    pub status: &'a str,
    pub generated_image_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
