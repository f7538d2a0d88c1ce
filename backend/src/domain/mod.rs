//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities used by the API, the persistence
//! layer and the generation request controller, and the services that
//! implement the driving ports. Types document their invariants and serde
//! contracts in their own Rustdoc.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod generation;
pub mod generation_controller;
pub mod generation_service;
pub mod ports;
pub mod user;

pub use self::account_service::UserAccountService;
pub use self::auth::{
    AccessToken, AuthSession, Credentials, CredentialsValidationError, PASSWORD_MAX, PASSWORD_MIN,
    TokenClaims,
};
pub use self::error::{Error, ErrorCode};
pub use self::generation::{
    ALLOWED_IMAGE_TYPES, DEFAULT_RECENT_LIMIT, Generation, GenerationId, GenerationStatus,
    GenerationValidationError, MAX_RECENT_LIMIT, NewGeneration, PROMPT_MAX, Prompt, RecentLimit,
    StyleName, UploadedImage,
};
pub use self::generation_service::{GenerationStudioService, MODEL_OVERLOADED};
pub use self::user::{Email, User, UserAccount, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use studio::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
