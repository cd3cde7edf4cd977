use crate::contract::model::{NewUser, User, UserId};
use async_trait::async_trait;

/// Which users a read should return. Results are always newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserQuery {
    All,
    /// Case-insensitive substring match on name OR email.
    NameOrEmailContains(String),
}

impl UserQuery {
    pub fn matching(term: impl Into<String>) -> Self {
        Self::NameOrEmailContains(term.into())
    }
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Users selected by `query`, ordered by created_at desc then id desc.
    async fn find_users(&self, query: &UserQuery) -> anyhow::Result<Vec<User>>;
    /// Load a user by id.
    async fn find_by_id(&self, id: UserId) -> anyhow::Result<Option<User>>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: UserId) -> anyhow::Result<bool>;
    /// Number of stored users.
    async fn count(&self) -> anyhow::Result<u64>;
    /// Insert a user; the store assigns id and created_at.
    async fn insert(&self, new_user: NewUser) -> anyhow::Result<User>;
}
