use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::rest::dto::{ErrorBody, ErrorDetails};
use crate::domain::error::{DomainError, ErrorKind};

/// The user operation a failure happened in; selects the 500 summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListUsers,
    SearchUsers,
    DeleteUser,
}

impl Operation {
    fn failure_summary(self) -> &'static str {
        match self {
            Operation::ListUsers => "Failed to fetch users",
            Operation::SearchUsers => "Failed to search users",
            Operation::DeleteUser => "Failed to delete user",
        }
    }
}

/// Whether store causes may be echoed back to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorExposure {
    pub include_internal_details: bool,
}

impl ErrorExposure {
    pub fn development() -> Self {
        Self {
            include_internal_details: true,
        }
    }

    pub fn production() -> Self {
        Self {
            include_internal_details: false,
        }
    }
}

/// Error response of the users REST API.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: &str, message: Option<String>, details: ErrorDetails) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.to_owned(),
                message,
                details: Some(details),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn details(kind: ErrorKind) -> ErrorDetails {
    ErrorDetails {
        kind: kind.as_str().to_owned(),
        field: None,
        cause: None,
    }
}

/// Map a domain error onto the HTTP contract.
///
/// Store failures are logged here with the request line; their cause only
/// reaches the client when `exposure` allows it.
pub fn map_domain_error(
    e: &DomainError,
    op: Operation,
    exposure: ErrorExposure,
    method: &Method,
    uri: &Uri,
) -> ApiError {
    let kind = e.kind();
    let status = match kind {
        ErrorKind::ValidationError | ErrorKind::MissingQuery | ErrorKind::InvalidIdFormat => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match e {
        DomainError::Validation(v) => {
            let summary = match kind {
                ErrorKind::InvalidIdFormat => "Invalid user ID format",
                _ => "Invalid query parameters",
            };
            ApiError::new(
                status,
                summary,
                None,
                ErrorDetails {
                    kind: kind.as_str().to_owned(),
                    field: Some(v.field.to_owned()),
                    cause: Some(v.cause.clone()),
                },
            )
        }
        DomainError::MissingQuery => ApiError::new(
            status,
            "Search query parameter \"q\" is required",
            None,
            details(kind),
        ),
        DomainError::UserNotFound { .. } | DomainError::ConcurrentlyDeleted { .. } => {
            ApiError::new(status, "User not found", None, details(kind))
        }
        DomainError::Database { message } => {
            tracing::error!(
                method = %method,
                path = %uri.path(),
                cause = %message,
                "{}",
                op.failure_summary()
            );
            let message = exposure
                .include_internal_details
                .then(|| message.clone());
            ApiError::new(status, op.failure_summary(), message, details(kind))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::ValidationError;

    fn map(e: &DomainError, op: Operation, exposure: ErrorExposure) -> ApiError {
        map_domain_error(e, op, exposure, &Method::GET, &Uri::from_static("/api/users"))
    }

    #[test]
    fn invalid_id_maps_to_400_with_field_details() {
        let e = DomainError::from(ValidationError::invalid_id_format("ID must be a number"));
        let err = map(&e, Operation::DeleteUser, ErrorExposure::production());
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "Invalid user ID format");
        let details = err.body.details.unwrap();
        assert_eq!(details.kind, "invalid_id_format");
        assert_eq!(details.field.as_deref(), Some("id"));
        assert_eq!(details.cause.as_deref(), Some("ID must be a number"));
    }

    #[test]
    fn malformed_query_maps_to_400() {
        let e = DomainError::from(ValidationError::malformed("q", "dup"));
        let err = map(&e, Operation::ListUsers, ErrorExposure::production());
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "Invalid query parameters");
    }

    #[test]
    fn both_not_found_variants_map_to_404() {
        for e in [
            DomainError::user_not_found(3),
            DomainError::concurrently_deleted(3),
        ] {
            let err = map(&e, Operation::DeleteUser, ErrorExposure::production());
            assert_eq!(err.status, StatusCode::NOT_FOUND);
            assert_eq!(err.body.error, "User not found");
        }
    }

    #[test]
    fn store_cause_is_hidden_in_production() {
        let e = DomainError::database(&anyhow::anyhow!("disk I/O error"));
        let err = map(&e, Operation::SearchUsers, ErrorExposure::production());
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Failed to search users");
        assert_eq!(err.body.message, None);
        assert_eq!(err.body.details.unwrap().kind, "store_error");
    }

    #[test]
    fn store_cause_is_shown_in_development() {
        let e = DomainError::database(&anyhow::anyhow!("disk I/O error"));
        let err = map(&e, Operation::ListUsers, ErrorExposure::development());
        assert_eq!(err.body.error, "Failed to fetch users");
        assert_eq!(err.body.message.as_deref(), Some("disk I/O error"));
    }
}
