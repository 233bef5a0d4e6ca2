//! User account model.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier is empty or not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Email is empty after trimming whitespace.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email does not look like an address.
    #[error("email must contain a local part and a domain")]
    MalformedEmail,
    /// Email exceeds the maximum accepted length.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Stored password credential is empty.
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 254;

/// Validated email address used as the login identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if raw.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        // Deliberately loose: delivery is the mail system's problem, this only
        // rejects obviously broken input.
        let mut parts = raw.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || raw.trim() != raw {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(raw))
    }

    /// Borrow the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque password credential produced by the hashing boundary.
///
/// Never serialized into API responses; the only consumers are the
/// `PasswordHasher` port and the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash produced by the hashing boundary or loaded from storage.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self(raw))
    }

    /// Borrow the stored form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Balance granted to every newly registered account.
#[must_use]
pub fn starting_balance() -> Decimal {
    Decimal::from(500)
}

/// User account aggregate.
///
/// ## Invariants
/// - `balance` never goes negative through domain operations; the purchase
///   coordinator checks funds before any debit and the commit re-validates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    password_hash: PasswordHash,
    balance: Decimal,
}

impl User {
    /// Assemble a user from validated components.
    #[must_use]
    pub fn new(id: UserId, email: Email, password_hash: PasswordHash, balance: Decimal) -> Self {
        Self {
            id,
            email,
            password_hash,
            balance,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Login identifier, also used as the public display label.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Stored credential for verification at login.
    #[must_use]
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Current account balance.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Public projection safe to return to clients.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            balance: self.balance,
        }
    }
}

/// Client-facing view of a user: no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable identifier.
    pub id: UserId,
    /// Login identifier.
    pub email: Email,
    /// Current account balance.
    pub balance: Decimal,
}
