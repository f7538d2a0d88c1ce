//! Authentication primitives: credentials, issued tokens and sessions.
//!
//! Inbound adapters hand raw strings to the constructors here so that
//! validation happens before any port is called.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::user::{Email, User, UserId, UserValidationError};

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN: usize = 6;
/// Maximum password length accepted at signup.
pub const PASSWORD_MAX: usize = 100;

/// Validation failures for signup and login payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email failed validation.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password length outside [`PASSWORD_MIN`]..=[`PASSWORD_MAX`].
    PasswordLength {
        /// Characters supplied.
        length: usize,
    },
}

impl CredentialsValidationError {
    /// Payload field the failure relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::EmptyPassword | Self::PasswordLength { .. } => "password",
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(inner) => inner.fmt(f),
            Self::EmptyPassword => write!(f, "Password is required"),
            Self::PasswordLength { .. } => write!(
                f,
                "Password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"
            ),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::Email(value)
    }
}

/// Validated email and password pair.
///
/// The password keeps caller whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use studio::domain::Credentials;
///
/// let creds = Credentials::for_signup("Ada@Example.com", "hunter22").expect("valid");
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: Email,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Credentials for a new account; enforces the password length policy.
    pub fn for_signup(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        let length = password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(CredentialsValidationError::PasswordLength { length });
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Credentials for a login attempt; only requires a non-empty password.
    pub fn for_login(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password as supplied.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Signed bearer token handed to clients.
#[derive(Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Encoded token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Identity recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject of the token.
    pub user_id: UserId,
    /// Email at the time the token was issued.
    pub email: Email,
}

/// Result of a successful signup or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Bearer token for subsequent requests.
    pub token: AccessToken,
    /// Authenticated account.
    pub user: User,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bad", "secret1", "email")]
    #[case("a@b.io", "short", "password")]
    #[case("a@b.io", &"x".repeat(101), "password")]
    fn signup_rejects_invalid_payloads(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let err = Credentials::for_signup(email, password).expect_err("must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case("secret")]
    #[case(&"x".repeat(100))]
    fn signup_accepts_boundary_lengths(#[case] password: &str) {
        let creds = Credentials::for_signup("a@b.io", password).expect("valid");
        assert_eq!(creds.password(), password);
    }

    #[test]
    fn login_accepts_short_passwords_but_not_empty() {
        assert!(Credentials::for_login("a@b.io", "x").is_ok());
        assert_eq!(
            Credentials::for_login("a@b.io", "").expect_err("empty"),
            CredentialsValidationError::EmptyPassword
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(Credentials::for_signup("a@b.io", "ééééé").is_err());
        assert!(Credentials::for_signup("a@b.io", "éééééé").is_ok());
    }

    #[test]
    fn access_token_debug_is_redacted() {
        assert_eq!(format!("{:?}", AccessToken::new("abc")), "AccessToken(..)");
    }
}
