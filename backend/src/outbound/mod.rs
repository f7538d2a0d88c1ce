//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: mutex-guarded repositories for database-less runs
//! - **security**: bcrypt password hashing and HS256 bearer tokens
//! - **storage**: capability-scoped upload directory
//! - **simulation**: the mock image model
//! - **studio_client**: reqwest submitter used by the generation controller
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod security;
pub mod simulation;
pub mod storage;
pub mod studio_client;
