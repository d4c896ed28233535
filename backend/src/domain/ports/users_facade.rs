//! Driving port for the user business operations.
//!
//! The request pipeline guards the endpoints; everything behind the guards is
//! delegated to this facade. Each operation resolves to an [`Envelope`]
//! rather than a `Result`: the facade owns its failure modes and reports
//! them as 4xx/5xx envelopes, which the pipeline forwards untouched.

use async_trait::async_trait;

use crate::domain::{Envelope, UserDraft, UserFilter, UserId};

/// Business operations for the user resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersFacade: Send + Sync {
    /// Every stored user.
    async fn list_all(&self) -> Envelope;

    /// Users matching all supplied criteria.
    async fn find(&self, filter: &UserFilter) -> Envelope;

    /// Store a single new user.
    async fn create(&self, draft: UserDraft) -> Envelope;

    /// Store several new users at once.
    async fn bulk_create(&self, drafts: Vec<UserDraft>) -> Envelope;

    /// Fetch one user. Absence is reported as a 404 envelope.
    async fn get_by_id(&self, id: UserId) -> Envelope;

    /// Apply `draft` to an existing user.
    async fn update(&self, id: UserId, draft: UserDraft) -> Envelope;

    /// Remove a user.
    async fn delete_by_id(&self, id: UserId) -> Envelope;
}
