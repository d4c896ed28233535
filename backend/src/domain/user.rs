//! User resource types.
//!
//! The pipeline only interprets a user's identifier. Everything else is an
//! opaque JSON object owned by the facade, carried through as
//! [`UserProfile`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Largest identifier accepted on the wire (2^53 − 1).
///
/// Identifiers stay within the range JSON clients can represent exactly as
/// IEEE-754 doubles.
pub const MAX_USER_ID: u64 = 9_007_199_254_740_991;

/// Opaque profile fields attached to a user.
pub type UserProfile = Map<String, Value>;

/// Validation errors returned when parsing a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdValidationError {
    /// Input was empty.
    Empty,
    /// Input contained something other than ASCII digits.
    NotNumeric,
    /// Value exceeds [`MAX_USER_ID`].
    OutOfRange,
}

impl fmt::Display for UserIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "user id must not be empty"),
            Self::NotNumeric => write!(f, "user id must contain only decimal digits"),
            Self::OutOfRange => write!(f, "user id must not exceed {MAX_USER_ID}"),
        }
    }
}

impl std::error::Error for UserIdValidationError {}

/// Numeric user identifier.
///
/// ## Invariants
/// - The value is at most [`MAX_USER_ID`].
///
/// # Examples
/// ```
/// use users_api::domain::UserId;
///
/// let id: UserId = "42".parse().expect("valid id");
/// assert_eq!(id.get(), 42);
/// assert!("-1".parse::<UserId>().is_err());
/// assert!("4.2".parse::<UserId>().is_err());
/// assert!("9007199254740992".parse::<UserId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct UserId(u64);

impl UserId {
    /// Validate a numeric identifier.
    pub fn new(value: u64) -> Result<Self, UserIdValidationError> {
        if value > MAX_USER_ID {
            return Err(UserIdValidationError::OutOfRange);
        }
        Ok(Self(value))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for UserId {
    type Err = UserIdValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UserIdValidationError::NotNumeric);
        }
        // Only digits remain, so a parse failure can only be overflow.
        let value = raw
            .parse::<u64>()
            .map_err(|_| UserIdValidationError::OutOfRange)?;
        Self::new(value)
    }
}

impl TryFrom<u64> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for u64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored user: identifier plus opaque profile fields.
///
/// Serialises as a single flat JSON object, `{"id": 7, ...profile}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    #[serde(flatten)]
    profile: UserProfile,
}

impl User {
    /// Assemble a user. Any `id` key inside `profile` is dropped.
    pub fn new(id: UserId, mut profile: UserProfile) -> Self {
        profile.remove("id");
        Self { id, profile }
    }

    /// Identifier assigned by storage.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Profile fields.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Mutable profile fields.
    pub fn profile_mut(&mut self) -> &mut UserProfile {
        &mut self.profile
    }
}

/// Shape errors raised when reading create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDraftError {
    /// A single draft was not a JSON object.
    NotAnObject,
    /// A bulk payload was not a JSON array.
    NotAnArray,
    /// A bulk entry was not a JSON object.
    EntryNotAnObject { index: usize },
}

impl fmt::Display for UserDraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "user payload must be a JSON object"),
            Self::NotAnArray => write!(f, "bulk payload must be a JSON array of users"),
            Self::EntryNotAnObject { index } => {
                write!(f, "bulk payload entry {index} must be a JSON object")
            }
        }
    }
}

impl std::error::Error for UserDraftError {}

/// Client-supplied user fields for create and update operations.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use users_api::domain::UserDraft;
///
/// let draft = UserDraft::from_value(json!({ "name": "Ada" })).expect("object");
/// assert_eq!(draft.fields().get("name"), Some(&json!("Ada")));
/// assert!(UserDraft::from_value(json!("Ada")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserDraft(UserProfile);

impl UserDraft {
    /// Accept a JSON object as a draft.
    pub fn from_value(value: Value) -> Result<Self, UserDraftError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(UserDraftError::NotAnObject),
        }
    }

    /// Accept a JSON array of objects as a list of drafts.
    pub fn many_from_value(value: Value) -> Result<Vec<Self>, UserDraftError> {
        let Value::Array(entries) = value else {
            return Err(UserDraftError::NotAnArray);
        };
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::Object(fields) => Ok(Self(fields)),
                _ => Err(UserDraftError::EntryNotAnObject { index }),
            })
            .collect()
    }

    /// Supplied fields.
    pub fn fields(&self) -> &UserProfile {
        &self.0
    }

    /// Consume into the supplied fields.
    pub fn into_fields(self) -> UserProfile {
        self.0
    }
}

impl From<UserProfile> for UserDraft {
    fn from(value: UserProfile) -> Self {
        Self(value)
    }
}

/// Equality criteria for `find`, taken verbatim from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilter(BTreeMap<String, String>);

impl UserFilter {
    /// Wrap decoded query parameters.
    pub fn new(criteria: BTreeMap<String, String>) -> Self {
        Self(criteria)
    }

    /// Criteria keyed by field name.
    pub fn criteria(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// True when no criteria were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for UserFilter {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
