//! Integration-style tests for the users_directory module.
//!
//! Key points:
//! - Each test runs on a fresh in-memory SQLite DB and applies migrations.
//! - Service is constructed with the SeaORM-backed repository.
//! - Local client is tested against the same Service.
//! - REST layer is exercised via an Axum Router registered through real routes.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, NotSet, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

use users_directory::{
    api::rest::{dto::UserDto, error::ErrorExposure},
    config::UsersDirectoryConfig,
    contract::{client::UsersDirectoryApi, error::UsersDirectoryError, model::NewUser},
    domain::{repo::UsersRepository, service::Service, validation::SearchParams},
    gateways::local::UsersDirectoryLocalClient,
    infra::storage::{entity, migrations::Migrator, sea_orm_repo::SeaOrmUsersRepository, seeder},
    UsersDirectory,
};

/// Create a fresh test database for each test (in-memory SQLite) and run migrations.
async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        company: "Acme".to_string(),
        address: "1 Main Street".to_string(),
        city: "Springfield".to_string(),
    }
}

async fn insert_at(db: &DatabaseConnection, name: &str, email: &str, at: chrono::DateTime<Utc>) -> i64 {
    let am = entity::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        company: Set("Acme".to_string()),
        address: Set("1 Main Street".to_string()),
        city: Set("Springfield".to_string()),
        created_at: Set(at),
    };
    am.insert(db).await.expect("insert").id
}

struct Fixture {
    db: DatabaseConnection,
    repo: Arc<SeaOrmUsersRepository<DatabaseConnection>>,
    service: Arc<Service>,
}

async fn fixture() -> Fixture {
    let db = create_test_db().await;
    let repo = Arc::new(SeaOrmUsersRepository::new(db.clone()));
    let service = Arc::new(Service::new(repo.clone()));
    Fixture { db, repo, service }
}

fn router_for(service: Arc<Service>) -> Router {
    users_directory::api::rest::routes::register_routes(
        Router::new(),
        service,
        ErrorExposure::production(),
    )
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn names(json: &Value) -> Vec<String> {
    json.as_array()
        .expect("array body")
        .iter()
        .map(|u| u["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn unfiltered_list_is_newest_first() -> Result<()> {
    let f = fixture().await;
    let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    // Inserted out of order so id order and time order disagree.
    insert_at(&f.db, "Second", "second@example.com", t1 + Duration::hours(1)).await;
    insert_at(&f.db, "Third", "third@example.com", t1 + Duration::hours(2)).await;
    insert_at(&f.db, "First", "first@example.com", t1).await;

    let users = f.service.list_users(&SearchParams::default()).await?;
    let got: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(got, ["Third", "Second", "First"]);
    Ok(())
}

#[tokio::test]
async fn equal_timestamps_fall_back_to_id_desc() -> Result<()> {
    let f = fixture().await;
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let a = insert_at(&f.db, "A", "a@example.com", t).await;
    let b = insert_at(&f.db, "B", "b@example.com", t).await;

    let users = f.service.list_users(&SearchParams::default()).await?;
    let ids: Vec<_> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, [b, a]);
    Ok(())
}

#[tokio::test]
async fn search_is_case_insensitive_substring_on_name_or_email() -> Result<()> {
    let f = fixture().await;
    f.repo.insert(new_user("John Doe", "john@example.com")).await?;
    f.repo.insert(new_user("Jane Smith", "jane@corp.test")).await?;

    for q in ["john", "JOHN", "oh D"] {
        let users = f.service.search_users(&SearchParams::with_query(q)).await?;
        let got: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(got, ["John Doe"], "query {q:?}");
    }

    // Email-only match.
    let users = f.service.search_users(&SearchParams::with_query("CORP.TEST")).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Jane Smith");
    Ok(())
}

#[tokio::test]
async fn like_wildcards_in_query_match_literally() -> Result<()> {
    let f = fixture().await;
    f.repo.insert(new_user("Percy 100%", "percy@example.com")).await?;
    f.repo.insert(new_user("Under_Score", "under@example.com")).await?;
    f.repo.insert(new_user("Plain", "plain@example.com")).await?;

    let users = f.service.search_users(&SearchParams::with_query("%")).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Percy 100%");

    let users = f.service.search_users(&SearchParams::with_query("_")).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Under_Score");
    Ok(())
}

#[tokio::test]
async fn search_folds_non_ascii_letters() -> Result<()> {
    let f = fixture().await;
    f.repo.insert(new_user("ÉMILE ZOLA", "zola@example.fr")).await?;
    f.repo.insert(new_user("Emile Plain", "plain@example.com")).await?;

    for q in ["ÉMILE", "émile", "Émile zola"] {
        let users = f.service.search_users(&SearchParams::with_query(q)).await?;
        let got: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(got, ["ÉMILE ZOLA"], "query {q:?}");
    }

    let router = router_for(f.service.clone());
    for uri in ["/api/users?q=%C3%89MILE", "/api/users/search?q=%C3%A9mile"] {
        let (status, body) = send(&router, "GET", uri).await;
        assert_eq!(status, StatusCode::OK, "uri {uri}");
        assert_eq!(names(&body), ["ÉMILE ZOLA"], "uri {uri}");
    }
    Ok(())
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() -> Result<()> {
    let f = fixture().await;
    let first = f.repo.insert(new_user("A", "a@example.com")).await?;
    let second = f.repo.insert(new_user("B", "b@example.com")).await?;
    f.service.delete_user(second.id).await?;

    let third = f.repo.insert(new_user("C", "c@example.com")).await?;
    assert!(third.id > second.id);
    assert!(second.id > first.id);
    Ok(())
}

#[tokio::test]
async fn seeding_only_fills_an_empty_table() -> Result<()> {
    let f = fixture().await;
    assert_eq!(seeder::seed_if_empty(f.repo.as_ref()).await?, 12);
    assert_eq!(seeder::seed_if_empty(f.repo.as_ref()).await?, 0);
    assert_eq!(f.repo.count().await?, 12);

    let users = f.service.list_users(&SearchParams::with_query("john")).await?;
    let got: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(got, ["Michael Johnson", "John Doe"]);
    Ok(())
}

#[tokio::test]
async fn module_bootstrap_migrates_and_seeds() -> Result<()> {
    let db = Database::connect("sqlite::memory:").await?;
    let module = UsersDirectory::new(db, UsersDirectoryConfig::default());
    module.migrate().await?;
    module.bootstrap().await;

    let users = module.client().list_users(None).await?;
    assert_eq!(users.len(), 12);
    assert_eq!(users[0].name, "Amanda Harris");
    Ok(())
}

#[tokio::test]
async fn module_bootstrap_respects_seed_flag() -> Result<()> {
    let db = Database::connect("sqlite::memory:").await?;
    let module = UsersDirectory::new(
        db,
        UsersDirectoryConfig {
            seed_on_startup: false,
        },
    );
    module.migrate().await?;
    module.bootstrap().await;

    assert!(module.client().list_users(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn local_client_maps_domain_errors() -> Result<()> {
    let f = fixture().await;
    let client: Arc<dyn UsersDirectoryApi> = Arc::new(UsersDirectoryLocalClient::new(f.service.clone()));
    let user = f.repo.insert(new_user("John Doe", "john@example.com")).await?;

    assert_eq!(
        client.search_users(String::new()).await.unwrap_err(),
        UsersDirectoryError::MissingQuery
    );
    assert_eq!(client.list_users(Some(String::new())).await?.len(), 1);

    let deleted = client.delete_user(user.id).await?;
    assert_eq!(deleted, user);
    assert_eq!(
        client.delete_user(user.id).await.unwrap_err(),
        UsersDirectoryError::not_found(user.id)
    );
    Ok(())
}

#[tokio::test]
async fn rest_list_and_search_agree() -> Result<()> {
    let f = fixture().await;
    seeder::seed_if_empty(f.repo.as_ref()).await?;
    let router = router_for(f.service.clone());

    for q in ["j", "JANE", "example.com", "son", "zzz", "%25"] {
        let (s1, listed) = send(&router, "GET", &format!("/api/users?q={q}")).await;
        let (s2, searched) = send(&router, "GET", &format!("/api/users/search?q={q}")).await;
        assert_eq!(s1, StatusCode::OK);
        assert_eq!(s2, StatusCode::OK);
        assert_eq!(listed, searched, "query {q:?}");
    }
    Ok(())
}

#[tokio::test]
async fn rest_search_requires_q_but_list_does_not() -> Result<()> {
    let f = fixture().await;
    seeder::seed_if_empty(f.repo.as_ref()).await?;
    let router = router_for(f.service.clone());

    for uri in ["/api/users/search", "/api/users/search?q="] {
        let (status, body) = send(&router, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Search query parameter \"q\" is required");
        assert_eq!(body["details"]["kind"], "missing_query");
    }

    for uri in ["/api/users", "/api/users?q="] {
        let (status, body) = send(&router, "GET", uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 12);
    }
    Ok(())
}

#[tokio::test]
async fn rest_rejects_repeated_q() -> Result<()> {
    let f = fixture().await;
    let router = router_for(f.service.clone());

    let (status, body) = send(&router, "GET", "/api/users?q=a&q=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query parameters");
    assert_eq!(body["details"]["kind"], "validation_error");
    assert_eq!(body["details"]["field"], "q");
    Ok(())
}

#[tokio::test]
async fn rest_scenario_search_then_delete_twice() -> Result<()> {
    let f = fixture().await;
    let john = f.repo.insert(new_user("John Doe", "john@example.com")).await?;
    f.repo.insert(new_user("Jane Smith", "jane@example.com")).await?;
    let router = router_for(f.service.clone());

    let (status, body) = send(&router, "GET", "/api/users?q=John").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["John Doe"]);
    let dto: Vec<UserDto> = serde_json::from_value(body)?;
    assert_eq!(dto[0].id, john.id);
    assert_eq!(dto[0].email, "john@example.com");

    let uri = format!("/api/users/{}", john.id);
    let (status, body) = send(&router, "DELETE", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(body["user"]["id"], john.id);
    assert_eq!(body["user"]["name"], "John Doe");
    assert!(body["user"]["createdAt"].is_string());

    let (status, body) = send(&router, "DELETE", &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (_, body) = send(&router, "GET", "/api/users").await;
    assert_eq!(names(&body), ["Jane Smith"]);
    Ok(())
}

#[tokio::test]
async fn rest_rejects_non_numeric_ids() -> Result<()> {
    let f = fixture().await;
    let router = router_for(f.service.clone());

    for uri in ["/api/users/abc", "/api/users/1a", "/api/users/-1", "/api/users/search"] {
        let (status, body) = send(&router, "DELETE", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert_eq!(body["error"], "Invalid user ID format");
        assert_eq!(body["details"]["kind"], "invalid_id_format");
    }
    Ok(())
}
