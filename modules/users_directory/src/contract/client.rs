use async_trait::async_trait;

use crate::contract::{
    error::UsersDirectoryError,
    model::{User, UserId},
};

/// Public API trait for the users_directory module that other modules can use
#[async_trait]
pub trait UsersDirectoryApi: Send + Sync {
    /// All users newest first, or those whose name/email contains `q` when it is non-empty.
    async fn list_users(&self, q: Option<String>) -> Result<Vec<User>, UsersDirectoryError>;

    /// Same predicate as `list_users`, but an empty `q` is rejected.
    async fn search_users(&self, q: String) -> Result<Vec<User>, UsersDirectoryError>;

    /// Delete a user and return the removed record.
    async fn delete_user(&self, id: UserId) -> Result<User, UsersDirectoryError>;
}
