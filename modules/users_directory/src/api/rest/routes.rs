use std::sync::Arc;

use axum::routing::{delete, get};
use axum::{Extension, Router};
use utoipa::OpenApi;

use crate::api::rest::error::ErrorExposure;
use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_users, handlers::search_users, handlers::delete_user),
    components(schemas(dto::UserDto, dto::DeleteUserResponse, dto::ErrorBody, dto::ErrorDetails)),
    tags((name = "users", description = "User directory"))
)]
pub struct UsersApiDoc;

/// Mount the users routes onto `router`.
pub fn register_routes(router: Router, service: Arc<Service>, exposure: ErrorExposure) -> Router {
    let users = Router::new()
        .route("/api/users", get(handlers::list_users))
        .route(
            "/api/users/search",
            get(handlers::search_users).delete(handlers::delete_search_segment),
        )
        .route("/api/users/{id}", delete(handlers::delete_user))
        .layer(Extension(service))
        .layer(Extension(exposure));

    router.merge(users)
}
