//! Uniform result shape shared by the users facade and the request pipeline.
//!
//! Every facade operation and every validator failure resolves to an
//! [`Envelope`]: a status code plus a JSON payload. Inbound adapters write the
//! envelope to the wire without transforming it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

use super::{Error, ErrorCode};

/// Lowest status code an envelope may carry.
pub const STATUS_MIN: u16 = 100;
/// Highest status code an envelope may carry.
pub const STATUS_MAX: u16 = 599;

/// Validation errors returned by [`Envelope::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeValidationError {
    StatusOutOfRange { status: u16 },
}

impl fmt::Display for EnvelopeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusOutOfRange { status } => write!(
                f,
                "status code {status} is outside {STATUS_MIN}..={STATUS_MAX}"
            ),
        }
    }
}

impl std::error::Error for EnvelopeValidationError {}

/// Status code and payload produced by a business operation or a validator.
///
/// ## Invariants
/// - `status_code` lies within `100..=599`.
/// - `payload` is plain JSON and therefore always serialisable.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use users_api::domain::Envelope;
///
/// let envelope = Envelope::ok(json!([{ "id": 1 }]));
/// assert_eq!(envelope.status_code(), 200);
/// assert!(envelope.is_success());
///
/// assert!(Envelope::new(42, json!(null)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "EnvelopeDto", into = "EnvelopeDto")]
pub struct Envelope {
    status_code: u16,
    payload: Value,
}

impl Envelope {
    /// Build an envelope after checking the status range.
    pub fn new(status_code: u16, payload: Value) -> Result<Self, EnvelopeValidationError> {
        if !(STATUS_MIN..=STATUS_MAX).contains(&status_code) {
            return Err(EnvelopeValidationError::StatusOutOfRange {
                status: status_code,
            });
        }
        Ok(Self {
            status_code,
            payload,
        })
    }

    /// `200 OK` envelope.
    pub fn ok(payload: Value) -> Self {
        Self {
            status_code: 200,
            payload,
        }
    }

    /// `201 Created` envelope.
    pub fn created(payload: Value) -> Self {
        Self {
            status_code: 201,
            payload,
        }
    }

    /// Status code to emit.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Payload to emit as the response body.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Split into status code and payload.
    pub fn into_parts(self) -> (u16, Value) {
        (self.status_code, self.payload)
    }
}

/// Status code associated with each error category.
pub fn status_for(code: ErrorCode) -> u16 {
    match code {
        ErrorCode::InvalidRequest => 400,
        ErrorCode::Unauthorized => 401,
        ErrorCode::Forbidden => 403,
        ErrorCode::NotFound => 404,
        ErrorCode::ServiceUnavailable => 503,
        ErrorCode::InternalError => 500,
    }
}

impl From<Error> for Envelope {
    fn from(value: Error) -> Self {
        Self::from(&value)
    }
}

impl From<&Error> for Envelope {
    /// Failure envelope carrying the client-safe view of `value`.
    fn from(value: &Error) -> Self {
        let redacted = value.redacted();
        let payload = match serde_json::to_value(&redacted) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to serialise error payload");
                json!({ "code": "internal_error", "message": "Internal server error" })
            }
        };
        Self {
            status_code: status_for(value.code()),
            payload,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeDto {
    status_code: u16,
    payload: Value,
}

impl From<Envelope> for EnvelopeDto {
    fn from(value: Envelope) -> Self {
        Self {
            status_code: value.status_code,
            payload: value.payload,
        }
    }
}

impl TryFrom<EnvelopeDto> for Envelope {
    type Error = EnvelopeValidationError;

    fn try_from(value: EnvelopeDto) -> Result<Self, Self::Error> {
        Self::new(value.status_code, value.payload)
    }
}
