//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] carries the static parts of the document: metadata, the
//! health probes, the schema wrappers and the bearer security scheme. The
//! users paths are derived from the [`RouteTable`] by
//! [`ApiDoc::for_routes`], so the document cannot drift from what the
//! server actually mounts.
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use actix_web::http::Method;
use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{Array, ObjectBuilder, Schema, Type};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme};
use utoipa::openapi::{Content, ContentBuilder, Ref, Required, Response, ResponseBuilder};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::pipeline::Operation;
use crate::inbound::http::routes::{Route, RouteTable};
use crate::inbound::http::schemas::{
    ERROR_SCHEMA_NAME, ErrorCodeSchema, ErrorSchema, USER_SCHEMA_NAME, UserSchema,
};

/// Name of the bearer token security scheme.
pub const BEARER_SCHEME: &str = "BearerToken";
const JSON: &str = "application/json";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("HS256 token whose `sub` is the caller's user id."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Users API",
        description = "Guarded CRUD interface for the user resource plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(UserSchema, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "users", description = "Operations on the user resource"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Full document with every route of `table` mounted under `prefix`.
    ///
    /// # Examples
    /// ```
    /// use users_api::doc::ApiDoc;
    /// use users_api::inbound::http::routes::RouteTable;
    ///
    /// let doc = ApiDoc::for_routes(&RouteTable::users(), "/users");
    /// assert!(doc.paths.paths.contains_key("/users/{id}"));
    /// ```
    pub fn for_routes(table: &RouteTable, prefix: &str) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        for route in table.routes() {
            let Some(method) = http_method(route.method()) else {
                continue;
            };
            doc.paths.add_path_operation(
                format!("{prefix}{}", route.path()),
                vec![method],
                operation(route),
            );
        }
        doc
    }
}

fn http_method(method: &Method) -> Option<HttpMethod> {
    match *method {
        Method::GET => Some(HttpMethod::Get),
        Method::POST => Some(HttpMethod::Post),
        Method::PUT => Some(HttpMethod::Put),
        Method::DELETE => Some(HttpMethod::Delete),
        Method::PATCH => Some(HttpMethod::Patch),
        _ => None,
    }
}

fn json_ref(schema: &str) -> Content {
    ContentBuilder::new()
        .schema(Some(Ref::from_schema_name(schema)))
        .build()
}

fn json_array_of(schema: &str) -> Content {
    ContentBuilder::new()
        .schema(Some(Schema::Array(Array::new(Ref::from_schema_name(
            schema,
        )))))
        .build()
}

fn json_response(description: &str, content: Content) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(JSON, content)
        .build()
}

fn summary(operation: Operation) -> &'static str {
    match operation {
        Operation::ListAll => "List every user",
        Operation::Find => "Find users whose fields equal every query parameter",
        Operation::Create => "Create one user",
        Operation::BulkCreate => "Create several users",
        Operation::GetById => "Fetch one user",
        Operation::Update => "Merge fields into one user",
        Operation::DeleteById => "Delete one user",
    }
}

fn operation(route: &Route) -> utoipa::openapi::path::Operation {
    let op = route.pipeline().operation();
    let mut builder = OperationBuilder::new()
        .operation_id(Some(op.name()))
        .summary(Some(summary(op)))
        .tag("users")
        .response(
            "400",
            json_response("Malformed identifier or body", json_ref(ERROR_SCHEMA_NAME)),
        );

    builder = match op {
        Operation::ListAll | Operation::Find => builder.response(
            "200",
            json_response("Matching users", json_array_of(USER_SCHEMA_NAME)),
        ),
        Operation::Create => builder.response(
            "201",
            json_response("Stored user", json_ref(USER_SCHEMA_NAME)),
        ),
        Operation::BulkCreate => builder.response(
            "201",
            json_response("Stored users", json_array_of(USER_SCHEMA_NAME)),
        ),
        Operation::GetById | Operation::Update | Operation::DeleteById => builder.response(
            "200",
            json_response("The user", json_ref(USER_SCHEMA_NAME)),
        ),
    };

    builder = match op {
        Operation::Create | Operation::Update => builder.request_body(Some(
            RequestBodyBuilder::new()
                .content(JSON, json_ref(USER_SCHEMA_NAME))
                .required(Some(Required::True))
                .build(),
        )),
        Operation::BulkCreate => builder.request_body(Some(
            RequestBodyBuilder::new()
                .content(JSON, json_array_of(USER_SCHEMA_NAME))
                .required(Some(Required::True))
                .build(),
        )),
        _ => builder,
    };

    if route.pipeline().is_guarded() {
        builder = builder
            .parameter(
                ParameterBuilder::new()
                    .name("id")
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .description(Some("Decimal user id, at most 2^53 - 1"))
                    .schema(Some(Schema::Object(
                        ObjectBuilder::new().schema_type(Type::Integer).build(),
                    )))
                    .build(),
            )
            .securities(Some([SecurityRequirement::new(
                BEARER_SCHEME,
                Vec::<String>::new(),
            )]));
        for (status, description) in [
            ("401", "Missing or invalid bearer token"),
            ("403", "Caller neither owns the user nor administers users"),
            ("404", "User not found"),
            ("503", "Token verification unavailable"),
        ] {
            builder = builder.response(
                status,
                json_response(description, json_ref(ERROR_SCHEMA_NAME)),
            );
        }
    }

    builder.build()
}
