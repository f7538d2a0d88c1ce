//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth,
//!   generations, health)
//! - **Schemas**: the request and response bodies plus the shared error
//!   envelope
//! - **Security**: the bearer token scheme used by the generation routes
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::GenerationPayload;
use crate::domain::{Error, ErrorCode, GenerationStatus, User};
use crate::inbound::http::accounts::{AuthRequest, AuthResponse};
use crate::inbound::http::generations::GenerationUpload;
use crate::inbound::http::health::HealthSummary;

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /auth/signup or /auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Studio API",
        description = "Accounts, image generations and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::generations::create_generation,
        crate::inbound::http::generations::list_generations,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AuthRequest,
        AuthResponse,
        User,
        GenerationUpload,
        GenerationPayload,
        GenerationStatus,
        HealthSummary,
        Error,
        ErrorCode
    )),
    tags(
        (name = "auth", description = "Account signup and login"),
        (name = "generations", description = "Image generation requests"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
