//! HTTP inbound adapter exposing the users endpoints.
//!
//! [`routes::RouteTable`] maps each method and path to a
//! [`pipeline::Pipeline`]; [`response::emit`] writes the resulting envelope.

pub mod error;
pub mod health;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
