use thiserror::Error;

use crate::contract::model::UserId;
use crate::domain::validation::{ValidationError, ValidationErrorKind};

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Search query parameter \"q\" is required")]
    MissingQuery,

    #[error("User not found: {id}")]
    UserNotFound { id: UserId },

    /// The user existed at lookup time but was gone by the time of the delete.
    #[error("User {id} was deleted by another request")]
    ConcurrentlyDeleted { id: UserId },

    #[error("Database error: {message}")]
    Database { message: String },
}

/// Closed taxonomy the transport maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    MissingQuery,
    InvalidIdFormat,
    NotFound,
    StoreError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::MissingQuery => "missing_query",
            ErrorKind::InvalidIdFormat => "invalid_id_format",
            ErrorKind::NotFound => "not_found",
            ErrorKind::StoreError => "store_error",
        }
    }
}

impl DomainError {
    pub fn user_not_found(id: UserId) -> Self {
        Self::UserNotFound { id }
    }

    pub fn concurrently_deleted(id: UserId) -> Self {
        Self::ConcurrentlyDeleted { id }
    }

    /// Keeps the whole context chain of the store failure.
    pub fn database(err: &anyhow::Error) -> Self {
        Self::Database {
            message: format!("{err:#}"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(e) => match e.kind {
                ValidationErrorKind::Malformed => ErrorKind::ValidationError,
                ValidationErrorKind::InvalidIdFormat => ErrorKind::InvalidIdFormat,
            },
            DomainError::MissingQuery => ErrorKind::MissingQuery,
            DomainError::UserNotFound { .. } | DomainError::ConcurrentlyDeleted { .. } => {
                ErrorKind::NotFound
            }
            DomainError::Database { .. } => ErrorKind::StoreError,
        }
    }
}
