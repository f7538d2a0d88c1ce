//! Runtime settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `STUDIO_*` environment variables and config
//! files. Every field is optional; accessors apply the defaults.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use rand::RngCore;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

use studio::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use studio::outbound::security::{DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_TTL};
use studio::outbound::simulation::DEFAULT_OVERLOAD_PROBABILITY;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const EPHEMERAL_SECRET_BYTES: usize = 32;

/// Failures raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        /// Configured text.
        value: String,
        /// Parser failure.
        source: AddrParseError,
    },
    /// No signing secret and ephemeral secrets are not allowed.
    #[error("STUDIO_JWT_SECRET is required (set STUDIO_ALLOW_EPHEMERAL_SECRET=true for development)")]
    MissingJwtSecret,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STUDIO")]
pub struct StudioSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory repositories are used when absent.
    pub database_url: Option<String>,
    /// Directory holding uploaded and served images.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted image upload in bytes.
    pub max_upload_bytes: Option<usize>,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: Option<String>,
    /// Access token lifetime in hours.
    pub token_ttl_hours: Option<u64>,
    /// bcrypt work factor.
    pub bcrypt_cost: Option<u32>,
    /// Chance in `0.0..=1.0` that the simulated model is overloaded.
    pub overload_probability: Option<f64>,
    /// Permit a random signing secret outside debug builds.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

impl StudioSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Upload directory, defaulting to `./uploads`.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Upload limit, defaulting to 10 MiB.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Token lifetime, defaulting to seven days.
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl_hours
            .map_or(DEFAULT_TOKEN_TTL, |hours| Duration::from_secs(hours * 3_600))
    }

    /// bcrypt cost, defaulting to 10.
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST)
    }

    /// Overload probability, defaulting to 0.2.
    pub fn overload_probability(&self) -> f64 {
        self.overload_probability
            .unwrap_or(DEFAULT_OVERLOAD_PROBABILITY)
    }

    /// Signing secret bytes.
    ///
    /// Debug builds and `allow_ephemeral_secret` fall back to a random
    /// per-process secret, which invalidates tokens on restart.
    pub fn jwt_secret(&self) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        resolve_jwt_secret(
            self.jwt_secret.as_deref(),
            cfg!(debug_assertions) || self.allow_ephemeral_secret,
        )
    }
}

fn resolve_jwt_secret(
    configured: Option<&str>,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
    match configured.filter(|secret| !secret.trim().is_empty()) {
        Some(secret) => Ok(Zeroizing::new(secret.as_bytes().to_vec())),
        None if allow_ephemeral => {
            warn!("using temporary JWT secret (dev only)");
            let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_BYTES]);
            rand::thread_rng().fill_bytes(bytes.as_mut_slice());
            Ok(bytes)
        }
        None => Err(SettingsError::MissingJwtSecret),
    }
}
