//! User data model.
//!
//! Identifiers are assigned by the database, so [`User`] values only exist for
//! persisted rows. Incoming payloads are validated into [`NewUser`] and
//! [`UserChanges`] before they reach a port.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    NonPositiveId,
    EmptyEmail,
    EmailTooShort { min: usize },
    EmailTooLong { max: usize },
    InvalidEmail,
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be an integer"),
            Self::NonPositiveId => write!(f, "user id must be a positive integer"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooShort { min } => write!(f, "email must be at least {min} characters"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Database-assigned user identifier.
///
/// # Examples
/// ```
/// use user_service::domain::UserId;
///
/// let id: UserId = "42".parse().expect("numeric id");
/// assert_eq!(id.value(), 42);
/// assert!("0".parse::<UserId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UserId(i32);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: i32) -> Result<Self, UserValidationError> {
        if id <= 0 {
            return Err(UserValidationError::NonPositiveId);
        }
        Ok(Self(id))
    }

    /// Raw integer value.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parsed = raw
            .parse::<i32>()
            .map_err(|_| UserValidationError::InvalidId)?;
        Self::new(parsed)
    }
}

impl TryFrom<i32> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i32 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum allowed length for an email address.
pub const EMAIL_MIN: usize = 3;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is not our concern.
        let pattern = r"^[^@\s]+@[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique email address of a user, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }

        let length = trimmed.chars().count();
        if length < EMAIL_MIN {
            return Err(UserValidationError::EmailTooShort { min: EMAIL_MIN });
        }
        if length > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 100;

/// Optional human-readable name of a user, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, UserValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Field bundle used to build a persisted [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: Option<UserName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted application user.
///
/// Serialises as `{ "id", "email", "name", "createdAt", "updatedAt" }` with
/// `name` rendered as `null` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: Option<UserName>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            email,
            name,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            email,
            name,
            created_at,
            updated_at,
        }
    }

    /// Database-assigned identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Optional display name.
    pub fn name(&self) -> Option<&UserName> {
        self.name.as_ref()
    }

    /// Insert timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last modification.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Validated payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    email: EmailAddress,
    name: Option<UserName>,
}

impl NewUser {
    /// Build a creation payload from validated components.
    pub fn new(email: EmailAddress, name: Option<UserName>) -> Self {
        Self { email, name }
    }

    /// Fallible constructor from raw strings.
    pub fn try_from_strings(
        email: impl Into<String>,
        name: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let email = EmailAddress::new(email)?;
        let name = name.map(UserName::new).transpose()?;
        Ok(Self::new(email, name))
    }

    /// Email to store.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Name to store, if any.
    pub fn name(&self) -> Option<&UserName> {
        self.name.as_ref()
    }
}

/// Validated partial update.
///
/// `email` is replaced when present. `name` is tri-state: `None` keeps the
/// stored name, `Some(None)` clears it, `Some(Some(_))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    email: Option<EmailAddress>,
    name: Option<Option<UserName>>,
}

impl UserChanges {
    /// Build a change set from validated components.
    pub fn new(email: Option<EmailAddress>, name: Option<Option<UserName>>) -> Self {
        Self { email, name }
    }

    /// Fallible constructor from raw strings.
    pub fn try_from_strings(
        email: Option<String>,
        name: Option<Option<String>>,
    ) -> Result<Self, UserValidationError> {
        let email = email.map(EmailAddress::new).transpose()?;
        let name = name
            .map(|inner| inner.map(UserName::new).transpose())
            .transpose()?;
        Ok(Self::new(email, name))
    }

    /// Replacement email, if submitted.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Submitted name: `None` when absent, `Some(None)` when cleared.
    pub fn name(&self) -> Option<Option<&UserName>> {
        self.name.as_ref().map(Option::as_ref)
    }

    /// True when no field was submitted.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none()
    }
}
