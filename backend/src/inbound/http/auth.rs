//! Bearer token extraction for protected handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! credential checks and user identity derivation here.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Email, Error, TokenClaims, UserId};
use crate::inbound::http::state::HttpState;

const TOKEN_REQUIRED: &str = "Access token required";

/// Identity of the caller, taken from a verified `Authorization: Bearer`
/// token.
///
/// Missing tokens are rejected with `401 Unauthorized`; tokens that fail
/// verification with `403 Forbidden`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(TokenClaims);

impl AuthenticatedUser {
    /// Authenticated user's id.
    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }

    /// Email carried by the token.
    pub fn email(&self) -> &Email {
        &self.0.email
    }
}

/// Token part of a `Bearer` authorization header, if any.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req).ok_or_else(|| Error::unauthorized(TOKEN_REQUIRED))?;
    state.accounts.authenticate(token).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(actix_web::Error::from))
    }
}
