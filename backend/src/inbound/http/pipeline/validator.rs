//! Guards run ahead of a route's terminal operation.
//!
//! Each guard either passes, possibly binding a value into the
//! [`RequestContext`], or fails with the envelope the client receives.

use tracing::{debug, error, warn};

use super::RequestContext;
use crate::domain::ports::TokenVerificationError;
use crate::domain::{AccessToken, Envelope, Error, UserId};
use crate::inbound::http::state::HttpState;

const BEARER: &str = "Bearer";

/// Result of running one guard.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Continue with the next guard.
    Pass,
    /// Stop and respond with this envelope.
    Fail(Envelope),
}

impl ValidationOutcome {
    fn fail(error: Error) -> Self {
        Self::Fail(Envelope::from(error))
    }
}

/// The closed set of request guards.
///
/// Order matters: [`Validator::Existence`] reads the identifier bound by
/// [`Validator::Identifier`], and [`Validator::Authorization`] reads both
/// the identifier and the identity bound by [`Validator::Authentication`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// The `{id}` segment is a valid [`UserId`].
    Identifier,
    /// The facade knows the identified user.
    Existence,
    /// The caller presents a verifiable bearer token.
    Authentication,
    /// The caller owns the target user or administers all users.
    Authorization,
}

impl Validator {
    /// Guard chain protecting the per-user routes.
    pub const PER_USER: [Self; 4] = [
        Self::Identifier,
        Self::Existence,
        Self::Authentication,
        Self::Authorization,
    ];

    /// Short name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Existence => "existence",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
        }
    }

    /// Run this guard against `ctx`.
    pub async fn validate(self, ctx: &mut RequestContext, state: &HttpState) -> ValidationOutcome {
        match self {
            Self::Identifier => identifier(ctx),
            Self::Existence => existence(ctx, state).await,
            Self::Authentication => authentication(ctx, state).await,
            Self::Authorization => authorization(ctx),
        }
    }
}

fn identifier(ctx: &mut RequestContext) -> ValidationOutcome {
    match ctx.raw_id().map(str::parse::<UserId>) {
        Some(Ok(id)) => {
            ctx.bind_user_id(id);
            ValidationOutcome::Pass
        }
        Some(Err(err)) => {
            debug!(reason = %err, "rejecting malformed identifier");
            ValidationOutcome::fail(Error::invalid_request("invalid identifier"))
        }
        None => ValidationOutcome::fail(Error::invalid_request("invalid identifier")),
    }
}

async fn existence(ctx: &RequestContext, state: &HttpState) -> ValidationOutcome {
    let Some(id) = ctx.user_id() else {
        error!("existence guard ran before an identifier was bound");
        return ValidationOutcome::fail(Error::internal("identifier not bound"));
    };
    let envelope = state.users.get_by_id(id).await;
    match envelope.status_code() {
        _ if envelope.is_success() => ValidationOutcome::Pass,
        404 => ValidationOutcome::fail(Error::not_found("user not found")),
        status => {
            warn!(%id, status, "user lookup failed; forwarding facade response");
            ValidationOutcome::Fail(envelope)
        }
    }
}

fn bearer_token(ctx: &RequestContext) -> Result<AccessToken, Error> {
    let missing = || Error::unauthorized("missing token");
    let invalid = || Error::unauthorized("invalid token");

    let header = ctx.authorization().ok_or_else(missing)?;
    let text = header.to_str().map_err(|_| invalid())?.trim();
    if text.is_empty() {
        return Err(missing());
    }
    let (scheme, credentials) = text
        .split_once(char::is_whitespace)
        .unwrap_or((text, ""));
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return Err(invalid());
    }
    AccessToken::try_new(credentials).map_err(|_| missing())
}

async fn authentication(ctx: &mut RequestContext, state: &HttpState) -> ValidationOutcome {
    let token = match bearer_token(ctx) {
        Ok(token) => token,
        Err(err) => return ValidationOutcome::fail(err),
    };
    match state.tokens.verify(&token).await {
        Ok(identity) => {
            ctx.bind_identity(identity);
            ValidationOutcome::Pass
        }
        Err(TokenVerificationError::Unavailable { message }) => {
            warn!(%message, "token verifier unavailable");
            ValidationOutcome::fail(Error::service_unavailable(
                "token verification unavailable",
            ))
        }
        Err(err) => {
            debug!(reason = %err, "bearer token rejected");
            ValidationOutcome::fail(Error::unauthorized("invalid token"))
        }
    }
}

fn authorization(ctx: &RequestContext) -> ValidationOutcome {
    let (Some(target), Some(identity)) = (ctx.user_id(), ctx.identity()) else {
        error!("authorization guard ran before identifier and identity were bound");
        return ValidationOutcome::fail(Error::internal("caller not bound"));
    };
    if identity.may_act_on(target) {
        ValidationOutcome::Pass
    } else {
        debug!(subject = %identity.subject(), %target, "caller may not act on user");
        ValidationOutcome::fail(Error::forbidden("forbidden"))
    }
}

#[cfg(test)]
mod tests;
