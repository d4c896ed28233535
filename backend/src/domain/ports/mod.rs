//! Domain ports for the users API hexagon.
//!
//! - [`UsersFacade`] is the driving port the HTTP pipeline invokes once every
//!   guard passes.
//! - [`TokenVerifier`] is the driven port the authentication guard consults.

mod macros;
pub(crate) use macros::define_port_error;

mod token_verifier;
mod users_facade;

#[cfg(test)]
pub use token_verifier::MockTokenVerifier;
pub use token_verifier::{FixtureTokenVerifier, TokenVerificationError, TokenVerifier};
#[cfg(test)]
pub use users_facade::MockUsersFacade;
pub use users_facade::UsersFacade;
