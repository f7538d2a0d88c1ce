//! Account identity primitives.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by [`Email::new`] and [`UserId::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email did not look like `local@domain.tld`.
    InvalidEmail,
    /// Identifier was not a valid UUID.
    InvalidId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "Please provide a valid email"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = "uuid")]
pub struct UserId(Uuid);

impl UserId {
    /// Allocate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form.
    ///
    /// # Examples
    /// ```
    /// use studio::domain::UserId;
    ///
    /// let id = UserId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("uuid");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is not our concern.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address.
///
/// ## Invariants
/// - Trimmed and lower-cased.
/// - Contains exactly one `@` with a dotted domain and no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = "email", example = "user@example.com")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use studio::domain::Email;
    ///
    /// let email = Email::new("  Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    id: UserId,
    email: Email,
}

impl User {
    /// Build a user from validated parts.
    pub fn new(id: UserId, email: Email) -> Self {
        Self { id, email }
    }

    /// Identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Normalised email address.
    pub fn email(&self) -> &Email {
        &self.email
    }
}

/// Stored account including its password hash.
///
/// Never serialised; only persistence adapters and the account service see
/// the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Public identity.
    pub user: User,
    /// bcrypt hash of the account password.
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("a@b", UserValidationError::InvalidEmail)]
    #[case("two words@example.com", UserValidationError::InvalidEmail)]
    #[case("a@@example.com", UserValidationError::InvalidEmail)]
    fn rejects_bad_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Email::new(raw).expect_err("should fail"), expected);
    }

    #[rstest]
    #[case("user@example.com", "user@example.com")]
    #[case(" USER@Example.Com ", "user@example.com")]
    #[case("first.last+tag@sub.example.org", "first.last+tag@sub.example.org")]
    fn normalises_emails(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Email::new(raw).expect("valid").as_ref(), expected);
    }

    #[test]
    fn email_deserialisation_validates() {
        let ok: Email = serde_json::from_str("\"A@B.io\"").expect("valid");
        assert_eq!(ok.as_ref(), "a@b.io");
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }

    #[test]
    fn user_id_rejects_garbage() {
        assert_eq!(
            UserId::parse("not-a-uuid").expect_err("invalid"),
            UserValidationError::InvalidId
        );
    }

    #[test]
    fn user_serialises_id_and_email() {
        let id = UserId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("uuid");
        let user = User::new(id, Email::new("a@b.io").expect("email"));
        let value = serde_json::to_value(user).expect("serialise");
        assert_eq!(
            value,
            serde_json::json!({ "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "email": "a@b.io" })
        );
    }
}
