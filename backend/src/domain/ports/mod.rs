//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`AccountService`, `GenerationCommand`, `GenerationQuery`)
//! are called by inbound adapters. Driven ports describe the storage,
//! security, simulation and client adapters the domain relies on; each
//! exposes a typed error enum built with `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod generation_command;
mod generation_query;
mod generation_repository;
mod generation_simulator;
mod generation_submitter;
mod image_store;
mod password_hasher;
mod token_issuer;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
pub use generation_command::{CreateGenerationRequest, GenerationCommand};
#[cfg(test)]
pub use generation_command::MockGenerationCommand;
pub use generation_query::GenerationQuery;
#[cfg(test)]
pub use generation_query::MockGenerationQuery;
pub use generation_repository::{
    GenerationOutcomeUpdate, GenerationPersistenceError, GenerationRepository,
};
#[cfg(test)]
pub use generation_repository::MockGenerationRepository;
pub use generation_simulator::{GenerationSimulator, SimulationVerdict};
#[cfg(test)]
pub use generation_simulator::MockGenerationSimulator;
pub use generation_submitter::{
    GenerationPayload, GenerationRequest, GenerationSubmitError, GenerationSubmitter,
    SubmitErrorKind,
};
#[cfg(test)]
pub use generation_submitter::MockGenerationSubmitter;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
