//! Tests to verify that handlers and the service emit the expected spans and events

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use tracing_test::traced_test;

use users_directory::api::rest::error::ErrorExposure;
use users_directory::api::rest::routes::register_routes;
use users_directory::contract::model::{NewUser, User, UserId};
use users_directory::domain::repo::{UserQuery, UsersRepository};
use users_directory::domain::service::Service;

struct EmptyRepository;

#[async_trait::async_trait]
impl UsersRepository for EmptyRepository {
    async fn find_users(&self, _query: &UserQuery) -> Result<Vec<User>> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>> {
        Ok(None)
    }

    async fn delete(&self, _id: UserId) -> Result<bool> {
        Ok(false)
    }

    async fn count(&self) -> Result<u64> {
        Ok(0)
    }

    async fn insert(&self, _new_user: NewUser) -> Result<User> {
        anyhow::bail!("not supported")
    }
}

/// Holds exactly one user until it is deleted.
struct SingleUserRepository;

#[async_trait::async_trait]
impl UsersRepository for SingleUserRepository {
    async fn find_users(&self, _query: &UserQuery) -> Result<Vec<User>> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(Some(User {
            id,
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            company: "Acme".to_string(),
            address: "2 Side Street".to_string(),
            city: "Springfield".to_string(),
            created_at: chrono::Utc::now(),
        }))
    }

    async fn delete(&self, _id: UserId) -> Result<bool> {
        Ok(true)
    }

    async fn count(&self) -> Result<u64> {
        Ok(1)
    }

    async fn insert(&self, _new_user: NewUser) -> Result<User> {
        anyhow::bail!("not supported")
    }
}

struct FailingRepository;

#[async_trait::async_trait]
impl UsersRepository for FailingRepository {
    async fn find_users(&self, _query: &UserQuery) -> Result<Vec<User>> {
        anyhow::bail!("database is locked")
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>> {
        anyhow::bail!("database is locked")
    }

    async fn delete(&self, _id: UserId) -> Result<bool> {
        anyhow::bail!("database is locked")
    }

    async fn count(&self) -> Result<u64> {
        anyhow::bail!("database is locked")
    }

    async fn insert(&self, _new_user: NewUser) -> Result<User> {
        anyhow::bail!("database is locked")
    }
}

fn app(repo: Arc<dyn UsersRepository>) -> Router {
    register_routes(
        Router::new(),
        Arc::new(Service::new(repo)),
        ErrorExposure::production(),
    )
}

async fn status_of(app: Router, method: &str, uri: &str) -> StatusCode {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
    .status()
}

#[tokio::test]
#[traced_test]
async fn list_handler_enters_rest_and_service_spans() {
    let status = status_of(app(Arc::new(EmptyRepository)), "GET", "/api/users?q=jo").await;
    assert_eq!(status, StatusCode::OK);

    assert!(logs_contain("users_directory.rest.list_users"));
    assert!(logs_contain("users_directory.service.list_users"));
    assert!(logs_contain("Listed 0 users"));
}

#[tokio::test]
#[traced_test]
async fn delete_handler_records_user_id() {
    let status = status_of(app(Arc::new(SingleUserRepository)), "DELETE", "/api/users/17").await;
    assert_eq!(status, StatusCode::OK);

    assert!(logs_contain("users_directory.service.delete_user"));
    assert!(logs_contain("user_id=17"));
    assert!(logs_contain("Deleted user"));
}

#[tokio::test]
#[traced_test]
async fn store_failures_are_logged_with_request_line() {
    let status = status_of(app(Arc::new(FailingRepository)), "GET", "/api/users/search?q=x").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert!(logs_contain("Failed to search users"));
    assert!(logs_contain("method=GET"));
    assert!(logs_contain("path=/api/users/search"));
    assert!(logs_contain("cause=database is locked"));
}
