//! Driven port for verifying caller access tokens.
//!
//! Token issuance and signing live outside this service; the pipeline only
//! asks whether a presented token is genuine and who it belongs to.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{AccessToken, Identity};

use super::define_port_error;

define_port_error! {
    /// Reasons a presented token was not accepted.
    pub enum TokenVerificationError {
        /// Token could not be decoded at all.
        Malformed => "access token is malformed",
        /// Signature, issuer or claims were rejected.
        Rejected { message: String } => "access token rejected: {message}",
        /// Token was genuine but has expired.
        Expired => "access token has expired",
        /// Verification backend could not be reached.
        Unavailable { message: String } => "token verification unavailable: {message}",
    }
}

/// Port resolving an access token into the caller's identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return the identity it asserts.
    async fn verify(&self, token: &AccessToken) -> Result<Identity, TokenVerificationError>;
}

/// Table-driven verifier for tests and local development.
///
/// Tokens not present in the table are rejected.
///
/// # Examples
/// ```
/// use users_api::domain::{AccessToken, Identity, UserId};
/// use users_api::domain::ports::{FixtureTokenVerifier, TokenVerifier};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let owner = Identity::user(UserId::new(42).unwrap());
/// let verifier = FixtureTokenVerifier::default().with_token("owner-token", owner);
/// let token = AccessToken::try_new("owner-token").unwrap();
/// assert_eq!(verifier.verify(&token).await.unwrap(), owner);
/// # });
/// ```
#[derive(Debug, Default, Clone)]
pub struct FixtureTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl FixtureTokenVerifier {
    /// Accept `token` as proof of `identity`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl TokenVerifier for FixtureTokenVerifier {
    async fn verify(&self, token: &AccessToken) -> Result<Identity, TokenVerificationError> {
        self.tokens
            .get(token.expose())
            .copied()
            .ok_or_else(|| TokenVerificationError::rejected("unknown token"))
    }
}
