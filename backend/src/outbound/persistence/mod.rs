//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories are thin translators between Diesel rows (`models`) and
//! domain types. Connections come from a `bb8` pool through `diesel-async`,
//! and every database failure is mapped to the port's error enum.
//!
//! ```ignore
//! use studio::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/studio")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_generation_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_generation_repository::DieselGenerationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
