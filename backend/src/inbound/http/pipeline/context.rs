//! Per-request data handed through the validator chain.

use actix_web::HttpRequest;
use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::web::Bytes;

use crate::domain::{Identity, UserId};

/// Raw request parts plus the values validators bind as they pass.
///
/// Validators only ever add bindings; nothing is removed once bound.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    raw_id: Option<String>,
    query: String,
    body: Bytes,
    body_unreadable: bool,
    authorization: Option<HeaderValue>,
    user_id: Option<UserId>,
    identity: Option<Identity>,
}

impl RequestContext {
    /// Capture the parts of `req` the pipeline reads.
    pub fn from_request(req: &HttpRequest, body: Bytes) -> Self {
        Self {
            raw_id: req.match_info().get("id").map(str::to_owned),
            query: req.query_string().to_owned(),
            body,
            body_unreadable: false,
            authorization: req.headers().get(AUTHORIZATION).cloned(),
            user_id: None,
            identity: None,
        }
    }

    /// Set the raw `{id}` path segment.
    #[must_use]
    pub fn with_raw_id(mut self, raw: impl Into<String>) -> Self {
        self.raw_id = Some(raw.into());
        self
    }

    /// Set the raw query string (without the leading `?`).
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Mark the body as unreadable (too large or interrupted).
    ///
    /// Only operations that decode the body report this, so guards still
    /// run first.
    #[must_use]
    pub fn with_unreadable_body(mut self) -> Self {
        self.body = Bytes::new();
        self.body_unreadable = true;
        self
    }

    /// Set the `Authorization` header value.
    #[must_use]
    pub fn with_authorization(mut self, value: HeaderValue) -> Self {
        self.authorization = Some(value);
        self
    }

    pub fn raw_id(&self) -> Option<&str> {
        self.raw_id.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_is_unreadable(&self) -> bool {
        self.body_unreadable
    }

    pub fn authorization(&self) -> Option<&HeaderValue> {
        self.authorization.as_ref()
    }

    /// Identifier bound by the identifier guard.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Caller bound by the authentication guard.
    pub fn identity(&self) -> Option<Identity> {
        self.identity
    }

    pub(crate) fn bind_user_id(&mut self, id: UserId) {
        self.user_id = Some(id);
    }

    pub(crate) fn bind_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }
}
