//! Envelope to HTTP response conversion.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use tracing::error;

use crate::domain::{Envelope, Error};

/// Write `envelope` as the response: its status, its payload as JSON.
///
/// An envelope whose status actix cannot represent degrades to a redacted
/// 500.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use users_api::domain::Envelope;
/// use users_api::inbound::http::response::emit;
///
/// let response = emit(Envelope::created(json!({ "id": 1 })));
/// assert_eq!(response.status().as_u16(), 201);
/// ```
pub fn emit(envelope: Envelope) -> HttpResponse {
    let (status_code, payload) = envelope.into_parts();
    match StatusCode::from_u16(status_code) {
        Ok(status) => HttpResponse::build(status).json(payload),
        Err(err) => {
            error!(status_code, error = %err, "envelope carried an unrepresentable status");
            let (_, fallback) = Envelope::from(Error::internal("invalid status")).into_parts();
            HttpResponse::InternalServerError().json(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[rstest]
    #[case(Envelope::ok(json!([{ "id": 1 }])))]
    #[case(Envelope::created(json!({ "id": 2 })))]
    #[case(Envelope::new(418, json!({ "teapot": true })).expect("valid status"))]
    #[case(Envelope::new(204, Value::Null).expect("valid status"))]
    #[actix_web::test]
    async fn status_and_payload_are_written_verbatim(#[case] envelope: Envelope) {
        let response = emit(envelope.clone());

        assert_eq!(response.status().as_u16(), envelope.status_code());
        assert_eq!(
            response.headers().get("content-type").map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
        if envelope.status_code() != 204 {
            assert_eq!(&body_json(response).await, envelope.payload());
        }
    }
}
