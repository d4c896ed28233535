//! Authentication primitives: presented access tokens and caller identities.
//!
//! Inbound adapters build an [`AccessToken`] from request headers and hand it
//! to a [`crate::domain::ports::TokenVerifier`], which answers with the
//! caller's [`Identity`].

use std::fmt;

use zeroize::Zeroizing;

use super::UserId;

/// Domain error returned when a presented token is unusable before
/// verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessTokenValidationError {
    /// Token was missing or blank once trimmed.
    Empty,
}

impl fmt::Display for AccessTokenValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "access token must not be empty"),
        }
    }
}

impl std::error::Error for AccessTokenValidationError {}

/// Bearer token presented by a caller.
///
/// ## Invariants
/// - The token is trimmed and non-empty.
/// - The secret is wiped from memory on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use users_api::domain::AccessToken;
///
/// let token = AccessToken::try_new("  abc.def.ghi ").unwrap();
/// assert_eq!(token.expose(), "abc.def.ghi");
/// assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Construct a token from raw header text.
    pub fn try_new(raw: &str) -> Result<Self, AccessTokenValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccessTokenValidationError::Empty);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Secret token text for verifiers.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    subject: UserId,
    administrator: bool,
}

impl Identity {
    /// Regular user acting as `subject`.
    pub fn user(subject: UserId) -> Self {
        Self {
            subject,
            administrator: false,
        }
    }

    /// Caller holding the administrative capability.
    pub fn administrator(subject: UserId) -> Self {
        Self {
            subject,
            administrator: true,
        }
    }

    /// User the caller authenticated as.
    pub fn subject(&self) -> UserId {
        self.subject
    }

    /// Whether the caller may act on any user.
    pub fn is_administrator(&self) -> bool {
        self.administrator
    }

    /// Owners may act on themselves; administrators on anyone.
    pub fn may_act_on(&self, target: UserId) -> bool {
        self.administrator || self.subject == target
    }
}
