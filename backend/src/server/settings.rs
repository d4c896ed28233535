//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USERS_*` environment variables and an
//! optional configuration file; accessors apply defaults and validation.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::config::{DEFAULT_MAX_BODY_BYTES, DEFAULT_ROUTE_PREFIX};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_SECRET_FILE: &str = "/var/run/secrets/token_secret";
const DEFAULT_ADMIN_ROLE: &str = "admin";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The route prefix is not an absolute, parameter-free path.
    #[error("invalid route prefix '{value}'; expected '' or '/segment[/segment...]'")]
    InvalidRoutePrefix { value: String },
    /// The body limit must admit at least one byte.
    #[error("max body bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Path prefix the users routes are mounted under.
    pub route_prefix: Option<String>,
    /// File holding the token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Permit a generated secret when the secret file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Token role granting the administrative capability.
    pub admin_role: Option<String>,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: Option<usize>,
}

impl AppSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Normalised route prefix without a trailing slash, defaulting to
    /// `/users`. `/` mounts the routes at the root.
    pub fn route_prefix(&self) -> Result<String, SettingsError> {
        let value = self.route_prefix.as_deref().unwrap_or(DEFAULT_ROUTE_PREFIX);
        let trimmed = value.trim_end_matches('/');
        let valid = trimmed.is_empty()
            || (trimmed.starts_with('/')
                && !trimmed.contains(['{', '}', '?', '#'])
                && !trimmed.contains("//")
                && !trimmed.contains(char::is_whitespace));
        if valid {
            Ok(trimmed.to_owned())
        } else {
            Err(SettingsError::InvalidRoutePrefix {
                value: value.to_owned(),
            })
        }
    }

    /// Token secret location.
    pub fn token_secret_file(&self) -> PathBuf {
        self.token_secret_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_SECRET_FILE))
    }

    /// Administrator role name, defaulting to `admin`.
    pub fn admin_role(&self) -> &str {
        self.admin_role
            .as_deref()
            .filter(|role| !role.trim().is_empty())
            .unwrap_or(DEFAULT_ADMIN_ROLE)
    }

    /// Request body ceiling, defaulting to 256 KiB.
    pub fn max_body_bytes(&self) -> Result<usize, SettingsError> {
        match self.max_body_bytes {
            Some(0) => Err(SettingsError::ZeroBodyLimit),
            Some(limit) => Ok(limit),
            None => Ok(DEFAULT_MAX_BODY_BYTES),
        }
    }
}
