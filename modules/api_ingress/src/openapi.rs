use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::web::{self, HealthResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Management API",
        version = "0.1.0",
        description = "List, search and delete users"
    ),
    paths(web::health_check),
    components(schemas(HealthResponse, ErrorResponse)),
    tags((name = "health", description = "Service health"))
)]
struct IngressApiDoc;

/// The host document with every module document merged in.
pub fn build_openapi(
    modules: impl IntoIterator<Item = utoipa::openapi::OpenApi>,
) -> utoipa::openapi::OpenApi {
    let mut doc = IngressApiDoc::openapi();
    for module_doc in modules {
        doc.merge(module_doc);
    }
    doc
}
