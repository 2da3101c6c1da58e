use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub const USERS_PATH: &str = "/api/users";
pub const PROJECTS_PATH: &str = "/api/projects";

/// Mount the users and projects endpoints onto `router`.
///
/// Create answers 201; PUT and PATCH answer 202 with the stored record.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let api = Router::new()
        // GET /api/users, POST /api/users
        .route(
            USERS_PATH,
            get(handlers::list_users).post(handlers::create_user),
        )
        // GET, PUT, PATCH /api/users/{id}
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::replace_user)
                .patch(handlers::patch_user),
        )
        // GET /api/projects, POST /api/projects
        .route(
            PROJECTS_PATH,
            get(handlers::list_projects).post(handlers::create_project),
        )
        // GET, PUT, PATCH /api/projects/{id}
        .route(
            "/api/projects/{id}",
            get(handlers::get_project)
                .put(handlers::replace_project)
                .patch(handlers::patch_project),
        )
        .layer(Extension(service));

    router.merge(api)
}
