//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use studio::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use studio::outbound::persistence::DbPool;
use studio::outbound::security::{DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_TTL};
use studio::outbound::simulation::DEFAULT_OVERLOAD_PROBABILITY;
use zeroize::Zeroizing;

use super::settings::{SettingsError, StudioSettings};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upload_dir: PathBuf,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) max_upload_bytes: usize,
    pub(crate) token_ttl: Duration,
    pub(crate) bcrypt_cost: u32,
    pub(crate) overload_probability: f64,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration with default limits and in-memory storage.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, upload_dir: PathBuf, jwt_secret: Zeroizing<Vec<u8>>) -> Self {
        Self {
            bind_addr,
            upload_dir,
            jwt_secret,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            token_ttl: DEFAULT_TOKEN_TTL,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            overload_probability: DEFAULT_OVERLOAD_PROBABILITY,
            db_pool: None,
        }
    }

    /// Derive a configuration from loaded settings.
    ///
    /// # Errors
    ///
    /// Fails when the bind address is malformed or no signing secret is
    /// available.
    pub fn from_settings(settings: &StudioSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(
            settings.bind_addr()?,
            settings.upload_dir(),
            settings.jwt_secret()?,
        )
        .with_max_upload_bytes(settings.max_upload_bytes())
        .with_token_ttl(settings.token_ttl())
        .with_bcrypt_cost(settings.bcrypt_cost())
        .with_overload_probability(settings.overload_probability()))
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, accounts and generations are stored in PostgreSQL
    /// instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override the upload limit.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Override the access token lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Override the bcrypt work factor.
    #[must_use]
    pub fn with_bcrypt_cost(mut self, bcrypt_cost: u32) -> Self {
        self.bcrypt_cost = bcrypt_cost;
        self
    }

    /// Override the simulated overload probability.
    #[must_use]
    pub fn with_overload_probability(mut self, overload_probability: f64) -> Self {
        self.overload_probability = overload_probability;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
