//! Shared fixtures for the users_projects integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;

use users_projects::{
    api::rest::routes,
    domain::service::{Service, ServiceConfig},
    infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmStore},
};

/// Create a fresh test database for each test (in-memory SQLite) and run migrations.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Build the domain Service on top of the SeaORM store.
pub async fn create_test_service() -> Arc<Service> {
    let db = create_test_db().await;
    let store = SeaOrmStore::new(db);
    Arc::new(Service::new(Arc::new(store), ServiceConfig::default()))
}

/// Build the Service on a file-backed SQLite database in `dir`, pooled the
/// way the server connects, so concurrent sessions really compete.
pub async fn create_file_test_service(dir: &Path, max_conns: u32) -> Arc<Service> {
    let url = format!("sqlite://{}?mode=rwc", dir.join("campus.db").display());
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(max_conns)
        .sqlx_logging(false)
        .map_sqlx_sqlite_opts(|o| o.busy_timeout(Duration::from_secs(5)));
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to file database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    let store = SeaOrmStore::new(db);
    Arc::new(Service::new(Arc::new(store), ServiceConfig::default()))
}

/// Build an Axum router through the real route registration.
pub async fn create_test_router() -> Router {
    let service = create_test_service().await;
    routes::register_routes(Router::new(), service)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
