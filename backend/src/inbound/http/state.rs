//! Shared HTTP adapter state.
//!
//! Route handlers reach their collaborators through this state via
//! `actix_web::web::Data`, so they only depend on domain ports and remain
//! testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{TokenVerifier, UsersFacade};

/// Dependency bundle for the users pipeline.
#[derive(Clone)]
pub struct HttpState {
    /// Business operations behind every route.
    pub users: Arc<dyn UsersFacade>,
    /// Bearer token verification for guarded routes.
    pub tokens: Arc<dyn TokenVerifier>,
}

impl HttpState {
    /// Bundle the facade and token verifier.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use users_api::domain::ports::FixtureTokenVerifier;
    /// use users_api::inbound::http::state::HttpState;
    /// use users_api::outbound::memory::InMemoryUsersFacade;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(InMemoryUsersFacade::default()),
    ///     Arc::new(FixtureTokenVerifier::default()),
    /// );
    /// let _users = state.users.clone();
    /// ```
    pub fn new(users: Arc<dyn UsersFacade>, tokens: Arc<dyn TokenVerifier>) -> Self {
        Self { users, tokens }
    }
}
