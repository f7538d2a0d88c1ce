//! HS256 JSON Web Token adapter for the `TokenIssuer` port.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{AccessToken, Email, TokenClaims, User, UserId};

/// Default token lifetime: seven days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies HS256 tokens with a shared secret.
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    /// Issuer for `secret`; the secret copy is wiped once keys are derived.
    pub fn new(secret: &Zeroizing<Vec<u8>>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError> {
        let issued_at = self.clock.utc().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|error| TokenError::signing(error.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Self::validation();
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|error| {
            match error.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(error.to_string()),
            }
        })?;
        let claims = data.claims;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        let user_id =
            UserId::parse(&claims.sub).map_err(|error| TokenError::invalid(error.to_string()))?;
        let email = Email::new(&claims.email).map_err(|error| TokenError::invalid(error.to_string()))?;
        Ok(TokenClaims { user_id, email })
    }
}
