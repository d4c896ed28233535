//! Immutable route table binding method and path to a [`Pipeline`].
//!
//! The table is assembled once at start-up and shared read-only by every
//! worker. Static paths are always registered ahead of parameterised ones
//! so `/getAllUsers` is never captured by `/{id}`.

use std::sync::Arc;

use actix_web::http::Method;
use actix_web::web::{self, Bytes};
use actix_web::{HttpRequest, HttpResponse, Resource, Scope, guard};
use tracing::{debug, error};

use super::error::ApiResult;
use super::pipeline::{Operation, Pipeline, RequestContext, Validator};
use super::response::emit;
use super::state::HttpState;
use crate::domain::Error;

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: &'static str,
    pipeline: Pipeline,
}

impl Route {
    pub fn new(method: Method, path: &'static str, pipeline: Pipeline) -> Self {
        Self {
            method,
            path,
            pipeline,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path pattern relative to the mount prefix, e.g. `/{id}`.
    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Whether the pattern captures path segments.
    pub fn is_parameterised(&self) -> bool {
        self.path.contains('{')
    }
}

/// Ordered, immutable set of routes.
///
/// # Examples
/// ```
/// use actix_web::http::Method;
/// use users_api::inbound::http::routes::RouteTable;
///
/// let table = RouteTable::users();
/// let first = table.routes().next().expect("routes");
/// assert_eq!(first.method(), &Method::GET);
/// assert_eq!(first.path(), "/getAllUsers");
/// assert!(table.routes().last().expect("routes").is_parameterised());
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    /// Build a table, moving parameterised routes behind static ones while
    /// otherwise keeping the given order.
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();
        routes.sort_by_key(|route| route.is_parameterised());
        Self { routes }
    }

    /// The user resource: four open collection routes and three guarded
    /// per-user routes.
    pub fn users() -> Self {
        let per_user = |operation| Pipeline::new(Validator::PER_USER, operation);
        Self::new([
            Route::new(
                Method::GET,
                "/getAllUsers",
                Pipeline::unguarded(Operation::ListAll),
            ),
            Route::new(Method::GET, "/findUsers", Pipeline::unguarded(Operation::Find)),
            Route::new(Method::POST, "/create", Pipeline::unguarded(Operation::Create)),
            Route::new(
                Method::POST,
                "/bulkCreate",
                Pipeline::unguarded(Operation::BulkCreate),
            ),
            Route::new(Method::GET, "/{id}", per_user(Operation::GetById)),
            Route::new(Method::PUT, "/{id}", per_user(Operation::Update)),
            Route::new(Method::DELETE, "/{id}", per_user(Operation::DeleteById)),
        ])
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(AsRef::as_ref)
    }

    /// Mount every route under `prefix` (may be empty).
    ///
    /// Requests whose method matches no route on a path fall through to the
    /// application's default 404 service.
    pub fn scope(&self, prefix: &str) -> Scope {
        self.routes
            .iter()
            .fold(web::scope(prefix), |scope, route| scope.service(resource(route)))
    }
}

fn resource(route: &Arc<Route>) -> Resource {
    let handler_route = Arc::clone(route);
    web::resource(route.path)
        .guard(guard::Method(route.method.clone()))
        .route(web::route().to(
            move |req: HttpRequest, body: Result<Bytes, actix_web::Error>| {
                handle(Arc::clone(&handler_route), req, body)
            },
        ))
}

async fn handle(
    route: Arc<Route>,
    req: HttpRequest,
    body: Result<Bytes, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let state = req.app_data::<web::Data<HttpState>>().cloned().ok_or_else(|| {
        error!(path = route.path, "HttpState missing from app data");
        Error::internal("HttpState missing from app data")
    })?;
    let ctx = match body {
        Ok(body) => RequestContext::from_request(&req, body),
        Err(err) => {
            debug!(error = %err, "request body rejected");
            RequestContext::from_request(&req, Bytes::new()).with_unreadable_body()
        }
    };
    Ok(emit(route.pipeline.run(ctx, &state).await))
}
