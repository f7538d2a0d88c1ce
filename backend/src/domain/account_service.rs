//! Account domain service: signup, login and token authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountService, PasswordHashError, PasswordHasher, TokenError, TokenIssuer,
    UserPersistenceError, UserRepository,
};
use crate::domain::{AuthSession, Credentials, Error, TokenClaims, User, UserAccount, UserId};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_TOKEN: &str = "Invalid or expired token";
/// Hashed once with the configured hasher so unknown emails pay the same
/// verification cost as wrong passwords.
const DECOY_PASSWORD: &str = "studio-decoy-password";

/// Account service implementing the [`AccountService`] driving port.
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    decoy_hash: Arc<OnceCell<String>>,
}

impl<U> UserAccountService<U> {
    /// Create a service over the given adapters.
    pub fn new(users: Arc<U>, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("User with this email already exists")
        }
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_issue_error(error: TokenError) -> Error {
    Error::internal(format!("failed to issue access token: {error}"))
}

impl<U> UserAccountService<U>
where
    U: UserRepository,
{
    /// Run a verification that can never succeed.
    async fn verify_decoy(&self, password: &str) -> Result<(), Error> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash(DECOY_PASSWORD))
            .await
            .map_err(map_hash_error)?;
        self.hasher
            .verify(password, decoy)
            .await
            .map_err(map_hash_error)?;
        Ok(())
    }

    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let token = self.tokens.issue(&user).map_err(map_issue_error)?;
        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl<U> AccountService for UserAccountService<U>
where
    U: UserRepository,
{
    async fn signup(&self, credentials: &Credentials) -> Result<AuthSession, Error> {
        let email = credentials.email();
        if self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            debug!(%email, "signup rejected: email already registered");
            return Err(Error::conflict("User with this email already exists"));
        }

        let password_hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hash_error)?;
        let user = User::new(UserId::random(), email.clone());
        let account = UserAccount {
            user: user.clone(),
            password_hash,
        };
        // A concurrent signup can still win the race; the repository reports
        // that as a duplicate.
        self.users.create(&account).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "account created");

        self.session_for(user)
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, Error> {
        let Some(account) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            self.verify_decoy(credentials.password()).await?;
            debug!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            debug!(user_id = %account.user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.session_for(account.user)
    }

    fn authenticate(&self, token: &str) -> Result<TokenClaims, Error> {
        self.tokens.verify(token).map_err(|error| {
            debug!(%error, "bearer token rejected");
            Error::forbidden(INVALID_TOKEN)
        })
    }
}
