//! Password hashing and bearer token adapters.

mod bcrypt_hasher;
mod jwt_tokens;

pub use bcrypt_hasher::{BcryptPasswordHasher, DEFAULT_BCRYPT_COST};
pub use jwt_tokens::{DEFAULT_TOKEN_TTL, JwtTokenIssuer};
