use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};
use utoipa::OpenApi;

use crate::api::rest::error::ErrorExposure;
use crate::api::rest::routes::{self, UsersApiDoc};
use crate::config::UsersDirectoryConfig;
use crate::contract::client::UsersDirectoryApi;
use crate::domain::repo::UsersRepository;
use crate::domain::service::Service;
use crate::gateways::local::UsersDirectoryLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;
use crate::infra::storage::seeder;

/// The users module: wires the repository to the domain service and exposes
/// it over REST and as an in-process client.
#[derive(Clone)]
pub struct UsersDirectory {
    db: Option<DatabaseConnection>,
    repo: Arc<dyn UsersRepository>,
    service: Arc<Service>,
    config: UsersDirectoryConfig,
}

impl UsersDirectory {
    /// Build the module on a SeaORM connection.
    pub fn new(db: DatabaseConnection, config: UsersDirectoryConfig) -> Self {
        let repo: Arc<dyn UsersRepository> = Arc::new(SeaOrmUsersRepository::new(db.clone()));
        let mut module = Self::with_repository(repo, config);
        module.db = Some(db);
        module
    }

    /// Build the module on any repository implementation. `migrate` becomes a no-op.
    pub fn with_repository(repo: Arc<dyn UsersRepository>, config: UsersDirectoryConfig) -> Self {
        debug!(seed_on_startup = config.seed_on_startup, "Loaded users_directory config");
        let service = Arc::new(Service::new(repo.clone()));
        Self {
            db: None,
            repo,
            service,
            config,
        }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let Some(db) = &self.db else {
            debug!("No database attached, skipping users_directory migrations");
            return Ok(());
        };
        info!("Running users_directory database migrations");
        Migrator::up(db, None).await?;
        info!("Users database migrations completed successfully");
        Ok(())
    }

    /// Startup work after migrations. Seeding failures are logged, not returned.
    pub async fn bootstrap(&self) {
        if !self.config.seed_on_startup {
            debug!("Seeding disabled");
            return;
        }
        if let Err(e) = seeder::seed_if_empty(self.repo.as_ref()).await {
            warn!(error = %format!("{e:#}"), "Seeding sample users failed, continuing");
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn UsersDirectoryApi> {
        Arc::new(UsersDirectoryLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router, exposure: ErrorExposure) -> axum::Router {
        info!("Registering users_directory REST routes");
        routes::register_routes(router, self.service.clone(), exposure)
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        UsersApiDoc::openapi()
    }
}
