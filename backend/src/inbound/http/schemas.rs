//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their wire shape and live in the inbound adapter
//! layer where framework concerns belong.

use utoipa::ToSchema;

/// Registered name of [`ErrorSchema`] (utoipa replaces `::` with `.`).
pub const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
/// Registered name of [`UserSchema`].
pub const USER_SCHEMA_NAME: &str = "crate.domain.User";

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in failure payloads.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A dependency needed to answer is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "forbidden")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "forbidden")]
    message: String,
    /// Correlation identifier, equal to the `trace-id` response header.
    #[schema(example = "6f1c5b0e-3d42-4c8e-9a7b-2e5f0c1d8a90")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. `{"field": "body"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// A stored user: numeric identifier plus free-form profile fields.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Identifier assigned on creation, at most 2^53 - 1.
    #[schema(example = 42)]
    id: u64,
    /// Creation time (RFC 3339).
    #[schema(example = "2026-03-01T09:00:00.000Z")]
    created_at: Option<String>,
    /// Last modification time (RFC 3339).
    #[schema(example = "2026-03-01T09:05:00.000Z")]
    updated_at: Option<String>,
}
