//! Terminal operations: decode boundary input and call the facade.

use std::collections::BTreeMap;

use actix_web::web::Query;
use serde_json::{Value, json};
use tracing::{debug, error};

use super::RequestContext;
use crate::domain::{Envelope, Error, UserDraft, UserFilter, UserId};
use crate::inbound::http::state::HttpState;

/// Facade call a route ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Every user.
    ListAll,
    /// Users matching the query string criteria.
    Find,
    /// One user from a JSON object body.
    Create,
    /// Several users from a JSON array body.
    BulkCreate,
    /// The user named by the bound identifier.
    GetById,
    /// Merge a JSON object body into the identified user.
    Update,
    /// Remove the identified user.
    DeleteById,
}

fn invalid_input(message: impl Into<String>, field: &str) -> Envelope {
    Envelope::from(Error::invalid_request(message).with_details(json!({ "field": field })))
}

fn json_body(ctx: &RequestContext) -> Result<Value, Envelope> {
    if ctx.body_is_unreadable() {
        return Err(invalid_input("request body could not be read", "body"));
    }
    serde_json::from_slice(ctx.body()).map_err(|err| {
        debug!(error = %err, "request body is not JSON");
        invalid_input("request body must be valid JSON", "body")
    })
}

fn draft(ctx: &RequestContext) -> Result<UserDraft, Envelope> {
    UserDraft::from_value(json_body(ctx)?).map_err(|err| invalid_input(err.to_string(), "body"))
}

fn drafts(ctx: &RequestContext) -> Result<Vec<UserDraft>, Envelope> {
    UserDraft::many_from_value(json_body(ctx)?).map_err(|err| invalid_input(err.to_string(), "body"))
}

fn filter(ctx: &RequestContext) -> Result<UserFilter, Envelope> {
    Query::<BTreeMap<String, String>>::from_query(ctx.query())
        .map(|query| UserFilter::new(query.into_inner()))
        .map_err(|err| {
            debug!(error = %err, "query string rejected");
            invalid_input("query string is malformed", "query")
        })
}

fn bound_id(ctx: &RequestContext) -> Result<UserId, Envelope> {
    ctx.user_id().ok_or_else(|| {
        error!("per-user operation reached without a bound identifier");
        Envelope::from(Error::internal("identifier not bound"))
    })
}

impl Operation {
    /// Stable camelCase name, also used as the OpenAPI operation id.
    pub fn name(self) -> &'static str {
        match self {
            Self::ListAll => "listAll",
            Self::Find => "find",
            Self::Create => "create",
            Self::BulkCreate => "bulkCreate",
            Self::GetById => "getById",
            Self::Update => "update",
            Self::DeleteById => "deleteById",
        }
    }

    /// Decode the request input this operation needs and call the facade.
    ///
    /// Input that cannot be decoded yields a 400 envelope whose
    /// `details.field` names the offending part of the request.
    pub async fn invoke(self, ctx: &RequestContext, state: &HttpState) -> Envelope {
        match self.dispatch(ctx, state).await {
            Ok(envelope) | Err(envelope) => envelope,
        }
    }

    async fn dispatch(self, ctx: &RequestContext, state: &HttpState) -> Result<Envelope, Envelope> {
        let users = &state.users;
        Ok(match self {
            Self::ListAll => users.list_all().await,
            Self::Find => users.find(&filter(ctx)?).await,
            Self::Create => users.create(draft(ctx)?).await,
            Self::BulkCreate => users.bulk_create(drafts(ctx)?).await,
            Self::GetById => users.get_by_id(bound_id(ctx)?).await,
            Self::Update => {
                let id = bound_id(ctx)?;
                users.update(id, draft(ctx)?).await
            }
            Self::DeleteById => users.delete_by_id(bound_id(ctx)?).await,
        })
    }
}
