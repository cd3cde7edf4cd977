use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{User, UserId};
use crate::domain::error::DomainError;
use crate::domain::repo::{UserQuery, UsersRepository};
use crate::domain::validation::SearchParams;

/// Domain service with the directory's read and delete rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    /// All users, or those matching `q` when a non-empty term is present.
    #[instrument(name = "users_directory.service.list_users", skip(self, params), fields(q = ?params.q))]
    pub async fn list_users(&self, params: &SearchParams) -> Result<Vec<User>, DomainError> {
        let query = match params.term() {
            Some(term) => UserQuery::matching(term),
            None => UserQuery::All,
        };

        let users = self
            .repo
            .find_users(&query)
            .await
            .map_err(|e| DomainError::database(&e))?;

        debug!("Listed {} users", users.len());
        Ok(users)
    }

    /// Like `list_users`, but a term is mandatory.
    #[instrument(name = "users_directory.service.search_users", skip(self, params), fields(q = ?params.q))]
    pub async fn search_users(&self, params: &SearchParams) -> Result<Vec<User>, DomainError> {
        let term = params.term().ok_or(DomainError::MissingQuery)?;

        let users = self
            .repo
            .find_users(&UserQuery::matching(term))
            .await
            .map_err(|e| DomainError::database(&e))?;

        debug!("Search matched {} users", users.len());
        Ok(users)
    }

    /// Remove a user and return the record as it was before deletion.
    #[instrument(name = "users_directory.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: UserId) -> Result<User, DomainError> {
        let user = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(&e))?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(&e))?;

        if !deleted {
            warn!("User vanished between lookup and delete");
            return Err(DomainError::concurrently_deleted(id));
        }

        info!("Deleted user");
        Ok(user)
    }
}
