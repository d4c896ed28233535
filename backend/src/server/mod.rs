//! Server construction, configuration and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod secret;
mod settings;

pub use config::{DEFAULT_MAX_BODY_BYTES, DEFAULT_ROUTE_PREFIX, ServerConfig};
#[cfg(feature = "metrics")]
pub use metrics::{METRICS_ENDPOINT, prometheus_metrics};
pub use secret::{BuildMode, SecretError, TOKEN_SECRET_MIN_LEN, TokenSecret};
pub use settings::{AppSettings, SettingsError};

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::routes::RouteTable;
use crate::inbound::http::state::HttpState;

/// Everything one worker's [`App`] needs.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub routes: Arc<RouteTable>,
    pub route_prefix: String,
    pub max_body_bytes: usize,
}

/// Assemble the application: probes, debug-only API docs, then the route
/// table under its prefix, all wrapped in [`Trace`].
///
/// Probes and docs are registered ahead of the route scope so an empty
/// prefix cannot shadow them.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        routes,
        route_prefix,
        max_body_bytes,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::PayloadConfig::new(max_body_bytes))
        .wrap(Trace)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs").url(
            "/api-docs/openapi.json",
            ApiDoc::for_routes(&routes, &route_prefix),
        ),
    );

    app.service(routes.scope(&route_prefix))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        http_state,
        routes,
        route_prefix,
        max_body_bytes,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        routes,
        route_prefix,
        max_body_bytes,
    };

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(deps.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "users API listening");
    health_state.mark_ready();
    Ok(server)
}
