//! Domain primitives and ports.
//!
//! Purpose: define the strongly typed values the request pipeline reasons
//! about and the ports it delegates to. Types here stay free of actix-web so
//! they can be exercised without an HTTP runtime.
//!
//! Public surface:
//! - Envelope: status code plus JSON payload shared by every outcome.
//! - Error / ErrorCode: pipeline failure payload and its stable category.
//! - UserId, User, UserDraft, UserFilter: the user resource and its inputs.
//! - AccessToken, Identity: authentication values.
//! - TraceId: request correlation identifier.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::auth::{AccessToken, AccessTokenValidationError, Identity};
pub use self::envelope::{Envelope, EnvelopeValidationError, status_for};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    MAX_USER_ID, User, UserDraft, UserDraftError, UserFilter, UserId, UserIdValidationError,
    UserProfile,
};
