use thiserror::Error;

use crate::contract::model::UserId;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsersDirectoryError {
    #[error("User not found: {id}")]
    NotFound { id: UserId },

    #[error("Search query is required")]
    MissingQuery,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl UsersDirectoryError {
    pub fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for UsersDirectoryError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } | ConcurrentlyDeleted { id } => Self::not_found(id),
            MissingQuery => Self::MissingQuery,
            Validation(e) => Self::validation(e.to_string()),
            Database { .. } => Self::internal(),
        }
    }
}
