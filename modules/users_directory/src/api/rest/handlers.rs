use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, RawQuery},
    http::{Method, Uri},
    response::Json,
    Extension,
};
use tracing::{debug, info, instrument};

use crate::api::rest::dto::{DeleteUserResponse, ErrorBody, UserDto};
use crate::api::rest::error::{map_domain_error, ApiError, ErrorExposure, Operation};
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::domain::validation::{parse_search_params, parse_user_id, ValidationError};

fn to_dtos(users: Vec<crate::contract::model::User>) -> Json<Vec<UserDto>> {
    Json(users.into_iter().map(UserDto::from).collect())
}

/// List users, optionally filtered by `q`
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    operation_id = "users_directory.list_users",
    params(("q" = Option<String>, Query, description = "Case-insensitive substring of name or email")),
    responses(
        (status = 200, description = "Users, newest first", body = [UserDto]),
        (status = 400, description = "Malformed query", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
#[instrument(name = "users_directory.rest.list_users", skip_all)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    Extension(exposure): Extension<ErrorExposure>,
    RawQuery(raw): RawQuery,
    method: Method,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let result = match parse_search_params(raw.as_deref()) {
        Ok(params) => svc.list_users(&params).await,
        Err(e) => Err(DomainError::from(e)),
    };

    result
        .map(to_dtos)
        .map_err(|e| map_domain_error(&e, Operation::ListUsers, exposure, &method, &uri))
}

/// Search users by name or email; `q` is required
#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "users",
    operation_id = "users_directory.search_users",
    params(("q" = String, Query, description = "Case-insensitive substring of name or email")),
    responses(
        (status = 200, description = "Matching users, newest first", body = [UserDto]),
        (status = 400, description = "Missing or malformed query", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
#[instrument(name = "users_directory.rest.search_users", skip_all)]
pub async fn search_users(
    Extension(svc): Extension<Arc<Service>>,
    Extension(exposure): Extension<ErrorExposure>,
    RawQuery(raw): RawQuery,
    method: Method,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let result = match parse_search_params(raw.as_deref()) {
        Ok(params) => svc.search_users(&params).await,
        Err(e) => Err(DomainError::from(e)),
    };

    result
        .map(to_dtos)
        .map_err(|e| map_domain_error(&e, Operation::SearchUsers, exposure, &method, &uri))
}

/// Delete a user by numeric ID
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "users_directory.delete_user",
    params(("id" = String, Path, description = "Decimal user ID")),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 400, description = "Invalid ID format", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(exposure): Extension<ErrorExposure>,
    path: Result<Path<String>, PathRejection>,
    method: Method,
    uri: Uri,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    // A segment that does not decode to UTF-8 is still a malformed id.
    let raw_id = match path {
        Ok(Path(raw_id)) => raw_id,
        Err(rejection) => {
            debug!(%rejection, "id segment rejected by the path extractor");
            let e = DomainError::from(ValidationError::invalid_id_format("ID must be a number"));
            return Err(map_domain_error(&e, Operation::DeleteUser, exposure, &method, &uri));
        }
    };
    delete_by_raw_id(&svc, exposure, &raw_id, &method, &uri).await
}

/// `DELETE /api/users/search`: the static search route shadows `{id}`, so the
/// literal segment is handed to the same validation as any other id.
pub async fn delete_search_segment(
    Extension(svc): Extension<Arc<Service>>,
    Extension(exposure): Extension<ErrorExposure>,
    method: Method,
    uri: Uri,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    delete_by_raw_id(&svc, exposure, "search", &method, &uri).await
}

#[instrument(name = "users_directory.rest.delete_user", skip(svc, exposure, method, uri))]
async fn delete_by_raw_id(
    svc: &Service,
    exposure: ErrorExposure,
    raw_id: &str,
    method: &Method,
    uri: &Uri,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let result = match parse_user_id(raw_id) {
        Ok(id) => svc.delete_user(id).await,
        Err(e) => Err(DomainError::from(e)),
    };

    match result {
        Ok(user) => {
            info!(user_id = user.id, "User deleted via REST");
            Ok(Json(DeleteUserResponse::deleted(user)))
        }
        Err(e) => Err(map_domain_error(&e, Operation::DeleteUser, exposure, method, uri)),
    }
}
