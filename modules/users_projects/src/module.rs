use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersProjectsConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmStore;

/// Users and projects module: owns the domain service and knows how to
/// migrate its schema and mount its REST routes.
#[derive(Clone)]
pub struct UsersProjects {
    service: Arc<Service>,
}

impl UsersProjects {
    /// Apply pending schema migrations.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users_projects database migrations");
        Migrator::up(db, None).await?;
        info!("users_projects database migrations completed successfully");
        Ok(())
    }

    /// Wire the SeaORM store into the domain service.
    pub fn new(db: DatabaseConnection, cfg: &UsersProjectsConfig) -> Self {
        info!("Initializing users_projects module");
        debug!(
            "Loaded users_projects config: user name {}..={}, age {}..={}",
            cfg.min_user_name_length, cfg.max_user_name_length, cfg.min_age, cfg.max_age
        );

        let store = SeaOrmStore::new(db);
        let service_config = ServiceConfig {
            validation: cfg.validation_rules(),
        };
        let service = Service::new(Arc::new(store), service_config);

        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users_projects REST routes");
        let router = routes::register_routes(router, self.service());
        info!("users_projects REST routes registered successfully");
        router
    }
}
