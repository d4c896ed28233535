//! Users API entry-point: loads settings and the token secret, then serves
//! the guarded users routes.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, eyre};
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use users_api::inbound::http::health::HealthState;
use users_api::inbound::http::state::HttpState;
use users_api::outbound::memory::InMemoryUsersFacade;
use users_api::outbound::token::JwtTokenVerifier;
#[cfg(feature = "metrics")]
use users_api::server::prometheus_metrics;
use users_api::server::{AppSettings, BuildMode, ServerConfig, TokenSecret, create_server};

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| eyre!("failed to load settings: {e}"))?;

    let secret_path = settings.token_secret_file();
    let secret = TokenSecret::load(
        &secret_path,
        BuildMode::from_debug_assertions(),
        settings.allow_ephemeral_secret,
    )
    .wrap_err_with(|| format!("token secret at {}", secret_path.display()))?;
    if secret.is_ephemeral() {
        warn!(path = %secret_path.display(), "using generated token secret (dev only)");
    }
    info!(fingerprint = %secret.fingerprint(), "token secret loaded");

    let tokens = JwtTokenVerifier::new(secret.expose(), settings.admin_role());
    let http_state = HttpState::new(
        Arc::new(InMemoryUsersFacade::default()),
        Arc::new(tokens),
    );

    let config = ServerConfig::new(settings.bind_addr()?, http_state)
        .with_route_prefix(settings.route_prefix()?)
        .with_max_body_bytes(settings.max_body_bytes()?);

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(
        prometheus_metrics().map_err(|e| eyre!("failed to configure metrics: {e}"))?,
    ));

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await?;
    Ok(())
}
