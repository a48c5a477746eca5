//! Author domain model.
//!
//! # Responsibility
//! - Define the canonical author record and its validating mutators.
//! - Provide the external JSON projection (`AuthorRecord`).
//!
//! # Invariants
//! - `id` never changes after construction.
//! - Fields are private; every write goes through a rule in `model::rules`.
//! - A failed setter leaves the previous value in place.

use crate::model::id::{parse_author_id, AuthorId, AuthorIdSource};
use crate::model::rules::{
    normalize_activation_token, validate_avatar_url, validate_email, validate_password_hash,
    validate_username,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Author fields, named after their storage columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorField {
    Id,
    ActivationToken,
    AvatarUrl,
    Email,
    PasswordHash,
    Username,
}

impl AuthorField {
    /// Column name in the `author` table and key in `AuthorRecord` JSON.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Id => "authorId",
            Self::ActivationToken => "authorActivationToken",
            Self::AvatarUrl => "authorAvatarUrl",
            Self::Email => "authorEmail",
            Self::PasswordHash => "authorHash",
            Self::Username => "authorUsername",
        }
    }
}

impl Display for AuthorField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Stable tag for each validation rule, independent of field and detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    InvalidIdentifier,
    InvalidFormat,
    InvalidLength,
    InvalidUrl,
    TooLong,
    InvalidEmail,
    EmptyOrInsecure,
}

/// Field rule violation raised by constructors and setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorValidationError {
    InvalidIdentifier {
        field: AuthorField,
        reason: String,
    },
    InvalidFormat {
        field: AuthorField,
        expected: &'static str,
    },
    InvalidLength {
        field: AuthorField,
        expected: usize,
        actual: usize,
    },
    InvalidUrl {
        field: AuthorField,
        reason: String,
    },
    TooLong {
        field: AuthorField,
        max: usize,
        actual: usize,
    },
    InvalidEmail,
    EmptyOrInsecure {
        field: AuthorField,
    },
}

impl AuthorValidationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            Self::InvalidIdentifier { .. } => ValidationKind::InvalidIdentifier,
            Self::InvalidFormat { .. } => ValidationKind::InvalidFormat,
            Self::InvalidLength { .. } => ValidationKind::InvalidLength,
            Self::InvalidUrl { .. } => ValidationKind::InvalidUrl,
            Self::TooLong { .. } => ValidationKind::TooLong,
            Self::InvalidEmail => ValidationKind::InvalidEmail,
            Self::EmptyOrInsecure { .. } => ValidationKind::EmptyOrInsecure,
        }
    }

    /// Field the violated rule belongs to.
    pub fn field(&self) -> AuthorField {
        match self {
            Self::InvalidIdentifier { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidLength { field, .. }
            | Self::InvalidUrl { field, .. }
            | Self::TooLong { field, .. }
            | Self::EmptyOrInsecure { field } => *field,
            Self::InvalidEmail => AuthorField::Email,
        }
    }
}

impl Display for AuthorValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { field, reason } => {
                write!(f, "{field} is not a valid uuid: {reason}")
            }
            Self::InvalidFormat { field, expected } => {
                write!(f, "{field} is not valid: expected {expected}")
            }
            Self::InvalidLength {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field} must be exactly {expected} characters, got {actual}"
            ),
            Self::InvalidUrl { field, reason } => {
                write!(f, "{field} is not a valid absolute url: {reason}")
            }
            Self::TooLong { field, max, actual } => {
                write!(f, "{field} is too long: {actual} characters, max {max}")
            }
            Self::InvalidEmail => write!(f, "{} is empty or invalid", AuthorField::Email),
            Self::EmptyOrInsecure { field } => write!(f, "{field} is empty or insecure"),
        }
    }
}

impl Error for AuthorValidationError {}

/// Canonical author record.
///
/// Only reachable through [`Author::new`], [`Author::generate`] or
/// deserialization, all of which run every field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AuthorRecord", try_from = "AuthorRecord")]
pub struct Author {
    id: AuthorId,
    activation_token: Option<String>,
    avatar_url: String,
    email: String,
    password_hash: String,
    username: String,
}

/// External wire shape of an author.
///
/// Field names and the hyphenated id string are a stable contract for API
/// consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    pub author_id: String,
    pub author_activation_token: Option<String>,
    pub author_avatar_url: String,
    pub author_email: String,
    pub author_hash: String,
    pub author_username: String,
}

impl Author {
    /// Builds an author from caller-supplied values.
    ///
    /// Rules run in field order: id, activation token, avatar url, email,
    /// password hash, username. The first failure is returned as-is.
    pub fn new(
        id: impl AuthorIdSource,
        activation_token: Option<&str>,
        avatar_url: &str,
        email: &str,
        password_hash: &str,
        username: &str,
    ) -> Result<Self, AuthorValidationError> {
        let mut author = Self {
            id: parse_author_id(id)?,
            activation_token: None,
            avatar_url: String::new(),
            email: String::new(),
            password_hash: String::new(),
            username: String::new(),
        };
        author.set_activation_token(activation_token)?;
        author.set_avatar_url(avatar_url)?;
        author.set_email(email)?;
        author.set_password_hash(password_hash)?;
        author.set_username(username)?;
        Ok(author)
    }

    /// Builds an author with a freshly generated v4 id.
    pub fn generate(
        activation_token: Option<&str>,
        avatar_url: &str,
        email: &str,
        password_hash: &str,
        username: &str,
    ) -> Result<Self, AuthorValidationError> {
        Self::new(
            Uuid::new_v4(),
            activation_token,
            avatar_url,
            email,
            password_hash,
            username,
        )
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    /// Returns `None` once the account has been activated.
    pub fn activation_token(&self) -> Option<&str> {
        self.activation_token.as_deref()
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Sets or clears the activation token.
    ///
    /// `None` is a valid state and means "no pending activation".
    pub fn set_activation_token(
        &mut self,
        token: Option<&str>,
    ) -> Result<(), AuthorValidationError> {
        self.activation_token = token.map(normalize_activation_token).transpose()?;
        Ok(())
    }

    pub fn set_avatar_url(&mut self, avatar_url: &str) -> Result<(), AuthorValidationError> {
        self.avatar_url = validate_avatar_url(avatar_url)?;
        Ok(())
    }

    pub fn set_email(&mut self, email: &str) -> Result<(), AuthorValidationError> {
        self.email = validate_email(email)?;
        Ok(())
    }

    pub fn set_password_hash(&mut self, password_hash: &str) -> Result<(), AuthorValidationError> {
        self.password_hash = validate_password_hash(password_hash)?;
        Ok(())
    }

    pub fn set_username(&mut self, username: &str) -> Result<(), AuthorValidationError> {
        self.username = validate_username(username)?;
        Ok(())
    }

    /// Returns the external projection of this author.
    pub fn to_serializable(&self) -> AuthorRecord {
        AuthorRecord {
            author_id: self.id.hyphenated().to_string(),
            author_activation_token: self.activation_token.clone(),
            author_avatar_url: self.avatar_url.clone(),
            author_email: self.email.clone(),
            author_hash: self.password_hash.clone(),
            author_username: self.username.clone(),
        }
    }
}

impl From<Author> for AuthorRecord {
    fn from(value: Author) -> Self {
        value.to_serializable()
    }
}

impl TryFrom<AuthorRecord> for Author {
    type Error = AuthorValidationError;

    fn try_from(value: AuthorRecord) -> Result<Self, Self::Error> {
        Self::new(
            value.author_id.as_str(),
            value.author_activation_token.as_deref(),
            &value.author_avatar_url,
            &value.author_email,
            &value.author_hash,
            &value.author_username,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Author, AuthorField, ValidationKind};

    fn hash() -> String {
        format!("$argon2id$v=19$m=65536,t=4,p=1${}", "x".repeat(66))
    }

    #[test]
    fn sample_hash_has_reserved_length() {
        assert_eq!(hash().len(), 97);
    }

    #[test]
    fn failed_setter_keeps_previous_value() {
        let mut author = Author::generate(
            None,
            "https://example.com/a.png",
            "a@example.com",
            &hash(),
            "alice",
        )
        .unwrap();

        let err = author.set_username("   ").unwrap_err();
        assert_eq!(err.kind(), ValidationKind::EmptyOrInsecure);
        assert_eq!(err.field(), AuthorField::Username);
        assert_eq!(author.username(), "alice");
    }

    #[test]
    fn constructor_reports_first_failing_field() {
        let err = Author::new(
            "not-a-uuid",
            Some("nothex"),
            "relative/path",
            "bad",
            "",
            "",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ValidationKind::InvalidIdentifier);

        let err = Author::generate(Some("nothex"), "relative/path", "bad", "", "").unwrap_err();
        assert_eq!(err.field(), AuthorField::ActivationToken);

        let err = Author::generate(None, "relative/path", "bad", "", "").unwrap_err();
        assert_eq!(err.field(), AuthorField::AvatarUrl);
    }

    #[test]
    fn error_messages_name_the_column() {
        let err = Author::generate(None, "https://example.com", "bad", &hash(), "a").unwrap_err();
        assert_eq!(err.to_string(), "authorEmail is empty or invalid");
    }
}
