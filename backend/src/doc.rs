//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the HTTP endpoints of the inbound layer and the
//! schema wrappers for domain types. The document backs Swagger UI in debug
//! builds and is exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::ask::{AskRequestBody, AskResponseBody};
use crate::inbound::http::courses::CourseResponse;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CS Assistant API",
        description = "Question answering and course lookup for Computer Science students."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::ask::ask,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AskRequestBody,
        AskResponseBody,
        CourseResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "cs", description = "Student questions and course records"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
