use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UsersDirectoryApi,
    error::UsersDirectoryError,
    model::{User, UserId},
};
use crate::domain::{service::Service, validation::SearchParams};

/// Local implementation of the UsersDirectoryApi trait that delegates to the domain service
pub struct UsersDirectoryLocalClient {
    service: Arc<Service>,
}

impl UsersDirectoryLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersDirectoryApi for UsersDirectoryLocalClient {
    async fn list_users(&self, q: Option<String>) -> Result<Vec<User>, UsersDirectoryError> {
        let params = SearchParams { q };
        self.service
            .list_users(&params)
            .await
            .map_err(UsersDirectoryError::from)
    }

    async fn search_users(&self, q: String) -> Result<Vec<User>, UsersDirectoryError> {
        self.service
            .search_users(&SearchParams::with_query(q))
            .await
            .map_err(UsersDirectoryError::from)
    }

    async fn delete_user(&self, id: UserId) -> Result<User, UsersDirectoryError> {
        self.service
            .delete_user(id)
            .await
            .map_err(UsersDirectoryError::from)
    }
}
