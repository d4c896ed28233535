//! HS256 JSON Web Token adapter for the [`TokenVerifier`] port.
//!
//! Tokens carry the caller's user id in `sub` (decimal string or number),
//! an `exp` expiry and an optional `roles` list. Holding the configured
//! administrator role grants the administrative capability.

use async_trait::async_trait;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{TokenVerificationError, TokenVerifier};
use crate::domain::{AccessToken, Identity, UserId};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Subject {
    Number(u64),
    Text(String),
}

impl Subject {
    fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Number(value) => UserId::new(*value).ok(),
            Self::Text(text) => text.parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Subject,
    #[serde(default)]
    roles: Vec<String>,
}

/// Verifies HS256-signed bearer tokens against a shared secret.
pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
    admin_role: String,
}

impl JwtTokenVerifier {
    /// Build a verifier for tokens signed with `secret`.
    pub fn new(secret: &[u8], admin_role: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            admin_role: admin_role.into(),
        }
    }
}

fn map_jwt_error(err: &JwtError) -> TokenVerificationError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenVerificationError::expired(),
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenVerificationError::malformed(),
        _ => TokenVerificationError::rejected(err.to_string()),
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &AccessToken) -> Result<Identity, TokenVerificationError> {
        let data = decode::<Claims>(token.expose(), &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "bearer token failed verification");
            map_jwt_error(&err)
        })?;
        let claims = data.claims;
        let subject = claims
            .sub
            .user_id()
            .ok_or_else(|| TokenVerificationError::rejected("subject is not a user id"))?;
        if claims.roles.iter().any(|role| *role == self.admin_role) {
            Ok(Identity::administrator(subject))
        } else {
            Ok(Identity::user(subject))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    const SECRET: &[u8] = b"test-signing-secret";

    #[fixture]
    fn verifier() -> JwtTokenVerifier {
        JwtTokenVerifier::new(SECRET, "admin")
    }

    fn sign(claims: &Value, secret: &[u8]) -> AccessToken {
        let raw = encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
            .expect("encode token");
        AccessToken::try_new(&raw).expect("non-empty token")
    }

    fn in_an_hour() -> i64 {
        Utc::now().timestamp() + 3_600
    }

    fn id(value: u64) -> UserId {
        UserId::new(value).expect("valid id")
    }

    #[rstest]
    #[case(json!("42"))]
    #[case(json!(42))]
    #[tokio::test]
    async fn accepts_string_and_numeric_subjects(verifier: JwtTokenVerifier, #[case] sub: Value) {
        let token = sign(&json!({ "sub": sub, "exp": in_an_hour() }), SECRET);

        let identity = verifier.verify(&token).await.expect("valid token");

        assert_eq!(identity, Identity::user(id(42)));
    }

    #[rstest]
    #[tokio::test]
    async fn admin_role_grants_administration(verifier: JwtTokenVerifier) {
        let token = sign(
            &json!({ "sub": "1", "exp": in_an_hour(), "roles": ["reader", "admin"] }),
            SECRET,
        );

        let identity = verifier.verify(&token).await.expect("valid token");

        assert!(identity.is_administrator());
        assert_eq!(identity.subject(), id(1));
    }

    #[rstest]
    #[tokio::test]
    async fn expired_tokens_are_reported_as_expired(verifier: JwtTokenVerifier) {
        let token = sign(
            &json!({ "sub": "1", "exp": Utc::now().timestamp() - 3_600 }),
            SECRET,
        );

        let err = verifier.verify(&token).await.expect_err("expired");

        assert_eq!(err, TokenVerificationError::expired());
    }

    #[rstest]
    #[tokio::test]
    async fn foreign_signatures_are_rejected(verifier: JwtTokenVerifier) {
        let token = sign(&json!({ "sub": "1", "exp": in_an_hour() }), b"other-secret");

        let err = verifier.verify(&token).await.expect_err("bad signature");

        assert!(matches!(err, TokenVerificationError::Rejected { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn garbage_is_malformed(verifier: JwtTokenVerifier) {
        let token = AccessToken::try_new("not-a-jwt").expect("non-empty token");

        let err = verifier.verify(&token).await.expect_err("garbage");

        assert_eq!(err, TokenVerificationError::malformed());
    }

    #[rstest]
    #[tokio::test]
    async fn tokens_without_a_subject_are_malformed(verifier: JwtTokenVerifier) {
        let token = sign(&json!({ "exp": in_an_hour() }), SECRET);

        let err = verifier.verify(&token).await.expect_err("no subject");

        assert_eq!(err, TokenVerificationError::malformed());
    }

    #[rstest]
    #[case(json!({ "sub": "abc", "exp": 0 }))]
    #[case(json!({ "sub": "-4", "exp": 0 }))]
    #[case(json!({ "sub": "9007199254740992", "exp": 0 }))]
    #[tokio::test]
    async fn non_user_subjects_are_rejected(verifier: JwtTokenVerifier, #[case] mut claims: Value) {
        claims["exp"] = json!(in_an_hour());
        let token = sign(&claims, SECRET);

        let err = verifier.verify(&token).await.expect_err("bad subject");

        assert_eq!(err, TokenVerificationError::rejected("subject is not a user id"));
    }
}
