//! Guarded users API.
//!
//! Every request to a per-user endpoint runs through a fixed pipeline of
//! guards (identifier, existence, authentication, authorization) before the
//! users facade is consulted. Static endpoints skip the guards.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
