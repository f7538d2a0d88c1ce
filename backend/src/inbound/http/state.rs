//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, GenerationCommand, GenerationQuery};

/// Default maximum accepted upload: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Signup, login and bearer token verification.
    pub accounts: Arc<dyn AccountService>,
    /// Generation creation.
    pub generations: Arc<dyn GenerationCommand>,
    /// Generation listing.
    pub generations_query: Arc<dyn GenerationQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Signup, login and bearer token verification.
    pub accounts: Arc<dyn AccountService>,
    /// Generation creation.
    pub generations: Arc<dyn GenerationCommand>,
    /// Generation listing.
    pub generations_query: Arc<dyn GenerationQuery>,
    /// Largest accepted `imageUpload` part in bytes.
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state with an explicit upload limit.
    pub fn new(ports: HttpStatePorts, max_upload_bytes: usize) -> Self {
        let HttpStatePorts {
            accounts,
            generations,
            generations_query,
        } = ports;
        Self {
            accounts,
            generations,
            generations_query,
            max_upload_bytes,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, DEFAULT_MAX_UPLOAD_BYTES)
    }
}
