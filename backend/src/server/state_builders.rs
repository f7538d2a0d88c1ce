//! Builders for HTTP state ports over database or in-memory repositories.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use studio::domain::ports::{
    GenerationRepository, GenerationSimulator, ImageStore, PasswordHasher, TokenIssuer,
    UserRepository,
};
use studio::domain::{GenerationStudioService, UserAccountService};
use studio::inbound::http::state::{HttpState, HttpStatePorts};
use studio::outbound::memory::{InMemoryGenerationRepository, InMemoryUserRepository};
use studio::outbound::persistence::{DieselGenerationRepository, DieselUserRepository};
use studio::outbound::security::{BcryptPasswordHasher, JwtTokenIssuer};
use studio::outbound::simulation::RandomGenerationSimulator;
use studio::outbound::storage::CapStdImageStore;

use super::ServerConfig;

/// Adapters shared by both repository flavours.
struct SharedAdapters {
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    images: Arc<dyn ImageStore>,
    simulator: Arc<dyn GenerationSimulator>,
    clock: Arc<dyn Clock>,
}

impl SharedAdapters {
    fn from_config(config: &ServerConfig, images: CapStdImageStore) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        Self {
            hasher: Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
            tokens: Arc::new(JwtTokenIssuer::new(
                &config.jwt_secret,
                config.token_ttl,
                Arc::clone(&clock),
            )),
            images: Arc::new(images),
            simulator: Arc::new(RandomGenerationSimulator::new(
                config.overload_probability,
            )),
            clock,
        }
    }
}

/// Wire the account and generation services over one repository pair.
fn build_ports<U, G>(users: Arc<U>, generations: Arc<G>, adapters: SharedAdapters) -> HttpStatePorts
where
    U: UserRepository + 'static,
    G: GenerationRepository + 'static,
{
    let SharedAdapters {
        hasher,
        tokens,
        images,
        simulator,
        clock,
    } = adapters;
    let accounts = Arc::new(UserAccountService::new(users, hasher, tokens));
    let studio = Arc::new(GenerationStudioService::new(
        generations,
        images,
        simulator,
        clock,
    ));
    HttpStatePorts {
        accounts,
        generations: studio.clone(),
        generations_query: studio,
    }
}

/// Build the handler state, opening the upload directory.
///
/// Uses Diesel repositories when a pool is configured and mutex-guarded
/// in-memory repositories otherwise.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the upload directory cannot be created or
/// opened.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let images = CapStdImageStore::open(config.upload_dir.clone())?;
    let adapters = SharedAdapters::from_config(config, images);
    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselGenerationRepository::new(pool.clone())),
            adapters,
        ),
        None => {
            info!("no database configured; using in-memory repositories");
            build_ports(
                Arc::new(InMemoryUserRepository::default()),
                Arc::new(InMemoryGenerationRepository::default()),
                adapters,
            )
        }
    };
    Ok(web::Data::new(HttpState::new(
        ports,
        config.max_upload_bytes,
    )))
}
