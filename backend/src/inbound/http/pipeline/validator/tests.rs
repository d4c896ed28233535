//! Guard-level behaviour, each guard exercised in isolation.

use std::sync::Arc;

use actix_web::http::header::HeaderValue;
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::Identity;
use crate::domain::ports::{
    FixtureTokenVerifier, MockTokenVerifier, MockUsersFacade, TokenVerifier, UsersFacade,
};

const OWNER_TOKEN: &str = "owner-token";
const ADMIN_TOKEN: &str = "admin-token";

fn id(value: u64) -> UserId {
    UserId::new(value).expect("valid id")
}

fn state_with(users: impl UsersFacade + 'static, tokens: impl TokenVerifier + 'static) -> HttpState {
    HttpState::new(Arc::new(users), Arc::new(tokens))
}

#[fixture]
fn tokens() -> FixtureTokenVerifier {
    FixtureTokenVerifier::default()
        .with_token(OWNER_TOKEN, Identity::user(id(42)))
        .with_token(ADMIN_TOKEN, Identity::administrator(id(1)))
}

/// Facade that must never be consulted.
#[fixture]
fn untouched_users() -> MockUsersFacade {
    MockUsersFacade::new()
}

fn failure(outcome: ValidationOutcome) -> (u16, String) {
    match outcome {
        ValidationOutcome::Fail(envelope) => (
            envelope.status_code(),
            envelope.payload()["message"]
                .as_str()
                .unwrap_or_default()
                .to_owned(),
        ),
        ValidationOutcome::Pass => panic!("expected the guard to fail"),
    }
}

#[rstest]
#[case("42", 42)]
#[case("0", 0)]
#[case("007", 7)]
#[case("9007199254740991", 9_007_199_254_740_991)]
#[tokio::test]
async fn identifier_binds_valid_ids(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
    #[case] raw: &str,
    #[case] expected: u64,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default().with_raw_id(raw);

    let outcome = Validator::Identifier.validate(&mut ctx, &state).await;

    assert_eq!(outcome, ValidationOutcome::Pass);
    assert_eq!(ctx.user_id(), Some(id(expected)));
}

#[rstest]
#[case("abc")]
#[case("-1")]
#[case("+1")]
#[case("4.2")]
#[case("1e3")]
#[case(" 1")]
#[case("")]
#[case("9007199254740992")]
#[case("99999999999999999999999")]
#[tokio::test]
async fn identifier_rejects_malformed_ids(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
    #[case] raw: &str,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default().with_raw_id(raw);

    let outcome = Validator::Identifier.validate(&mut ctx, &state).await;

    assert_eq!(failure(outcome), (400, "invalid identifier".to_owned()));
    assert_eq!(ctx.user_id(), None);
}

#[rstest]
#[tokio::test]
async fn existence_passes_when_facade_finds_the_user(tokens: FixtureTokenVerifier) {
    let mut users = MockUsersFacade::new();
    users
        .expect_get_by_id()
        .with(eq(id(42)))
        .times(1)
        .return_const(Envelope::ok(json!({ "id": 42 })));
    let state = state_with(users, tokens);
    let mut ctx = RequestContext::default();
    ctx.bind_user_id(id(42));

    let outcome = Validator::Existence.validate(&mut ctx, &state).await;

    assert_eq!(outcome, ValidationOutcome::Pass);
}

#[rstest]
#[tokio::test]
async fn existence_reports_missing_users(tokens: FixtureTokenVerifier) {
    let mut users = MockUsersFacade::new();
    users
        .expect_get_by_id()
        .times(1)
        .return_const(Envelope::from(Error::not_found("user 7 not found")));
    let state = state_with(users, tokens);
    let mut ctx = RequestContext::default();
    ctx.bind_user_id(id(7));

    let outcome = Validator::Existence.validate(&mut ctx, &state).await;

    assert_eq!(failure(outcome), (404, "user not found".to_owned()));
}

#[rstest]
#[tokio::test]
async fn existence_forwards_facade_failures_unchanged(tokens: FixtureTokenVerifier) {
    let upstream = Envelope::new(502, json!({ "upstream": "down" })).expect("valid status");
    let mut users = MockUsersFacade::new();
    users
        .expect_get_by_id()
        .times(1)
        .return_const(upstream.clone());
    let state = state_with(users, tokens);
    let mut ctx = RequestContext::default();
    ctx.bind_user_id(id(7));

    let outcome = Validator::Existence.validate(&mut ctx, &state).await;

    assert_eq!(outcome, ValidationOutcome::Fail(upstream));
}

#[rstest]
#[tokio::test]
async fn existence_without_identifier_is_an_internal_fault(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default();

    let outcome = Validator::Existence.validate(&mut ctx, &state).await;

    assert_eq!(failure(outcome), (500, "Internal server error".to_owned()));
}

#[rstest]
#[case(None, 401, "missing token")]
#[case(Some(HeaderValue::from_static("")), 401, "missing token")]
#[case(Some(HeaderValue::from_static("Bearer")), 401, "missing token")]
#[case(Some(HeaderValue::from_static("Bearer    ")), 401, "missing token")]
#[case(Some(HeaderValue::from_static("Basic b3duZXI6cGFzcw==")), 401, "invalid token")]
#[case(Some(HeaderValue::from_static("owner-token")), 401, "invalid token")]
#[case(Some(HeaderValue::from_static("Bearer forged")), 401, "invalid token")]
#[case(
    Some(HeaderValue::from_bytes(b"Bearer \xff\xfe").expect("opaque header bytes")),
    401,
    "invalid token"
)]
#[tokio::test]
async fn authentication_rejects_absent_or_bad_credentials(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
    #[case] header: Option<HeaderValue>,
    #[case] status: u16,
    #[case] message: &str,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default();
    if let Some(value) = header {
        ctx = ctx.with_authorization(value);
    }

    let outcome = Validator::Authentication.validate(&mut ctx, &state).await;

    assert_eq!(failure(outcome), (status, message.to_owned()));
    assert_eq!(ctx.identity(), None);
}

#[rstest]
#[case("Bearer owner-token")]
#[case("bearer owner-token")]
#[case("  Bearer   owner-token  ")]
#[tokio::test]
async fn authentication_binds_the_verified_identity(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
    #[case] header: &'static str,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default().with_authorization(HeaderValue::from_static(header));

    let outcome = Validator::Authentication.validate(&mut ctx, &state).await;

    assert_eq!(outcome, ValidationOutcome::Pass);
    assert_eq!(ctx.identity(), Some(Identity::user(id(42))));
}

#[rstest]
#[case(TokenVerificationError::unavailable("timeout"), 503, "token verification unavailable")]
#[case(TokenVerificationError::expired(), 401, "invalid token")]
#[case(TokenVerificationError::malformed(), 401, "invalid token")]
#[tokio::test]
async fn authentication_maps_verifier_failures(
    untouched_users: MockUsersFacade,
    #[case] verifier_error: TokenVerificationError,
    #[case] status: u16,
    #[case] message: &str,
) {
    let mut verifier = MockTokenVerifier::new();
    verifier
        .expect_verify()
        .times(1)
        .returning(move |_| Err(verifier_error.clone()));
    let state = state_with(untouched_users, verifier);
    let mut ctx =
        RequestContext::default().with_authorization(HeaderValue::from_static("Bearer anything"));

    let outcome = Validator::Authentication.validate(&mut ctx, &state).await;

    assert_eq!(failure(outcome), (status, message.to_owned()));
}

#[rstest]
#[case(Identity::user(id(42)), 42)]
#[case(Identity::administrator(id(1)), 42)]
#[case(Identity::administrator(id(1)), 1)]
#[tokio::test]
async fn authorization_admits_owners_and_administrators(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
    #[case] caller: Identity,
    #[case] target: u64,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default();
    ctx.bind_user_id(id(target));
    ctx.bind_identity(caller);

    let outcome = Validator::Authorization.validate(&mut ctx, &state).await;

    assert_eq!(outcome, ValidationOutcome::Pass);
}

#[rstest]
#[tokio::test]
async fn authorization_refuses_other_users(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default();
    ctx.bind_user_id(id(42));
    ctx.bind_identity(Identity::user(id(7)));

    let outcome = Validator::Authorization.validate(&mut ctx, &state).await;

    assert_eq!(failure(outcome), (403, "forbidden".to_owned()));
}

#[rstest]
#[tokio::test]
async fn authorization_without_identity_is_an_internal_fault(
    untouched_users: MockUsersFacade,
    tokens: FixtureTokenVerifier,
) {
    let state = state_with(untouched_users, tokens);
    let mut ctx = RequestContext::default();
    ctx.bind_user_id(id(42));

    let outcome = Validator::Authorization.validate(&mut ctx, &state).await;

    assert_eq!(failure(outcome), (500, "Internal server error".to_owned()));
}
