//! bcrypt adapter for the `PasswordHasher` port.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt hashing on tokio's blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher with the given work factor, clamped to bcrypt's 4..=31.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, PasswordHashError>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|error| PasswordHashError::backend(error.to_string()))?
        .map_err(|error| PasswordHashError::backend(error.to_string()))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let cost = self.cost;
        run_blocking(move || bcrypt::hash(password.as_str(), cost)).await
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        run_blocking(move || bcrypt::verify(password.as_str(), &hash)).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn hashes_verify_and_reject_other_passwords() {
        let hasher = BcryptPasswordHasher::new(4);
        let hash = hasher.hash("secret1").await.expect("hash");

        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("secret1", &hash).await.expect("verify"));
        assert!(!hasher.verify("secret2", &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn malformed_hash_is_a_backend_error() {
        let err = BcryptPasswordHasher::new(4)
            .verify("secret1", "not-a-hash")
            .await
            .expect_err("malformed");
        assert!(matches!(err, PasswordHashError::Backend { .. }));
    }

    #[test]
    fn cost_is_clamped() {
        assert_eq!(BcryptPasswordHasher::new(1).cost, 4);
        assert_eq!(BcryptPasswordHasher::new(99).cost, 31);
        assert_eq!(BcryptPasswordHasher::default().cost, DEFAULT_BCRYPT_COST);
    }
}
