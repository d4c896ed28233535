//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use crate::inbound::http::routes::RouteTable;
use crate::inbound::http::state::HttpState;

/// Default mount point for the users routes.
pub const DEFAULT_ROUTE_PREFIX: &str = "/users";
/// Default request body ceiling in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
    pub(crate) routes: Arc<RouteTable>,
    pub(crate) route_prefix: String,
    pub(crate) max_body_bytes: usize,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Serve the standard users route table from `http_state`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            bind_addr,
            http_state,
            routes: Arc::new(RouteTable::users()),
            route_prefix: DEFAULT_ROUTE_PREFIX.to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Mount the route table under `prefix` instead of `/users`.
    #[must_use]
    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }

    /// Reject request bodies larger than `limit` bytes.
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the mount prefix for the route table.
    #[must_use]
    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
