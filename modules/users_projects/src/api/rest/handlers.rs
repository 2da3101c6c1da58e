use std::sync::Arc;

use axum::{http::StatusCode, response::Json, Extension};
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateProjectReq, CreateUserReq, PatchProjectReq, PatchUserReq, ProjectDto,
    ReplaceProjectReq, ReplaceUserReq, UserDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{RequestCtx, ValidJson, ValidPath};
use crate::api::rest::problem::ProblemResponse;
use crate::domain::resolver::Update;
use crate::domain::service::Service;

// --- users ---

/// List all users
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    info!("Listing users");

    match svc.list_users().await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ctx: RequestCtx,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    ValidJson(req_body): ValidJson<CreateUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Replace every field of a user (PUT)
pub async fn replace_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ctx: RequestCtx,
    ValidJson(req_body): ValidJson<ReplaceUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Replacing user {} with: {:?}", id, req_body);

    match svc.update_user(id, Update::Full(req_body.into())).await {
        Ok(user) => Ok((StatusCode::ACCEPTED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to replace user {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Update only the supplied fields of a user (PATCH)
pub async fn patch_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ctx: RequestCtx,
    ValidJson(req_body): ValidJson<PatchUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Patching user {} with: {:?}", id, req_body);

    match svc.update_user(id, Update::Partial(req_body.into())).await {
        Ok(user) => Ok((StatusCode::ACCEPTED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to patch user {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

// --- projects ---

/// List all projects
pub async fn list_projects(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
) -> Result<Json<Vec<ProjectDto>>, ProblemResponse> {
    info!("Listing projects");

    match svc.list_projects().await {
        Ok(projects) => Ok(Json(projects.into_iter().map(ProjectDto::from).collect())),
        Err(e) => {
            error!("Failed to list projects: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Get a specific project by ID
pub async fn get_project(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ctx: RequestCtx,
) -> Result<Json<ProjectDto>, ProblemResponse> {
    info!("Getting project with id: {}", id);

    match svc.get_project(id).await {
        Ok(project) => Ok(Json(ProjectDto::from(project))),
        Err(e) => {
            error!("Failed to get project {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Create a new project owned by an existing user
pub async fn create_project(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    ValidJson(req_body): ValidJson<CreateProjectReq>,
) -> Result<(StatusCode, Json<ProjectDto>), ProblemResponse> {
    info!("Creating project: {:?}", req_body);

    match svc.create_project(req_body.into()).await {
        Ok(project) => Ok((StatusCode::CREATED, Json(ProjectDto::from(project)))),
        Err(e) => {
            error!("Failed to create project: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Replace every field of a project (PUT)
pub async fn replace_project(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ctx: RequestCtx,
    ValidJson(req_body): ValidJson<ReplaceProjectReq>,
) -> Result<(StatusCode, Json<ProjectDto>), ProblemResponse> {
    info!("Replacing project {} with: {:?}", id, req_body);

    match svc.update_project(id, Update::Full(req_body.into())).await {
        Ok(project) => Ok((StatusCode::ACCEPTED, Json(ProjectDto::from(project)))),
        Err(e) => {
            error!("Failed to replace project {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Update only the supplied fields of a project (PATCH)
pub async fn patch_project(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ctx: RequestCtx,
    ValidJson(req_body): ValidJson<PatchProjectReq>,
) -> Result<(StatusCode, Json<ProjectDto>), ProblemResponse> {
    info!("Patching project {} with: {:?}", id, req_body);

    match svc.update_project(id, Update::Partial(req_body.into())).await {
        Ok(project) => Ok((StatusCode::ACCEPTED, Json(ProjectDto::from(project)))),
        Err(e) => {
            error!("Failed to patch project {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}
