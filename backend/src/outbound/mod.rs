//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local user store behind [`crate::domain::ports::UsersFacade`]
//! - **token**: HS256 JWT verification behind [`crate::domain::ports::TokenVerifier`]
//!
//! Adapters translate between domain types and their backing technology and
//! hold no request-pipeline logic.

pub mod memory;
pub mod token;
