use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::contract::model::{Project, ProjectFields, User, UserFields};
use crate::domain::error::DomainError;
use crate::domain::repo::EntityStore;
use crate::domain::resolver::{resolve, ProjectUpdate, Update, UserUpdate};
use crate::domain::validator::{
    ensure_owner_exists, update_owner_ref, ValidationRules, Validator,
};

/// Domain service with business rules for users and projects.
/// Depends only on the store port, not on infra types.
///
/// Every operation runs in its own store session: validate, resolve and
/// persist either all commit together or the session is dropped and rolled
/// back.
#[derive(Clone)]
pub struct Service {
    store: Arc<dyn EntityStore>,
    validator: Validator,
}

/// Configuration for the domain service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub validation: ValidationRules,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(store: Arc<dyn EntityStore>, config: ServiceConfig) -> Self {
        Self {
            store,
            validator: Validator::new(config.validation),
        }
    }

    // --- users ---

    #[instrument(name = "users_projects.service.create_user", skip(self, fields), fields(email = %fields.email))]
    pub async fn create_user(&self, fields: UserFields) -> Result<User, DomainError> {
        info!("Creating new user");

        self.validator.validate_create(&fields)?;

        let session = self.store.begin_write().await?;
        let user = session.create_user(fields).await?;
        session.commit().await?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "users_projects.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        debug!("Getting user by id");
        let session = self.store.begin().await?;
        let user = session.get_user(id).await?;
        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(name = "users_projects.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        debug!("Listing users");
        let session = self.store.begin().await?;
        let users = session.list_users().await?;
        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    #[instrument(
        name = "users_projects.service.update_user",
        skip(self, update),
        fields(user_id = id, mode = ?update.mode())
    )]
    pub async fn update_user(&self, id: i32, update: UserUpdate) -> Result<User, DomainError> {
        info!("Updating user");

        self.validator.validate_update(&update)?;

        let session = self.store.begin_write().await?;
        let current = session.get_user_for_update(id).await?;
        let next = resolve(&current, &update);

        let stored = match update {
            Update::Full(fields) => session.replace_user(id, fields).await?,
            Update::Partial(_) if next == current => {
                debug!("Patch leaves user unchanged; skipping write");
                current
            }
            Update::Partial(patch) => session.merge_user(id, patch).await?,
        };
        debug_assert_eq!(stored, next, "store disagrees with resolved user");
        session.commit().await?;

        info!("Successfully updated user");
        Ok(stored)
    }

    // --- projects ---

    #[instrument(
        name = "users_projects.service.create_project",
        skip(self, fields),
        fields(owner_id = fields.owner_id)
    )]
    pub async fn create_project(&self, fields: ProjectFields) -> Result<Project, DomainError> {
        info!("Creating new project");

        self.validator.validate_create(&fields)?;

        let session = self.store.begin_write().await?;
        ensure_owner_exists(session.as_ref(), fields.owner_id).await?;
        let project = session.create_project(fields).await?;
        session.commit().await?;

        info!("Successfully created project with id={}", project.id);
        Ok(project)
    }

    #[instrument(name = "users_projects.service.get_project", skip(self), fields(project_id = id))]
    pub async fn get_project(&self, id: i32) -> Result<Project, DomainError> {
        debug!("Getting project by id");
        let session = self.store.begin().await?;
        let project = session.get_project(id).await?;
        Ok(project)
    }

    #[instrument(name = "users_projects.service.list_projects", skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>, DomainError> {
        debug!("Listing projects");
        let session = self.store.begin().await?;
        let projects = session.list_projects().await?;
        debug!("Successfully listed {} projects", projects.len());
        Ok(projects)
    }

    #[instrument(
        name = "users_projects.service.update_project",
        skip(self, update),
        fields(project_id = id, mode = ?update.mode())
    )]
    pub async fn update_project(
        &self,
        id: i32,
        update: ProjectUpdate,
    ) -> Result<Project, DomainError> {
        info!("Updating project");

        self.validator.validate_update(&update)?;

        let session = self.store.begin_write().await?;
        let current = session.get_project_for_update(id).await?;

        // An invalid owner aborts before anything is written.
        if let Some(owner_id) = update_owner_ref(&update) {
            ensure_owner_exists(session.as_ref(), owner_id).await?;
        }

        let next = resolve(&current, &update);

        let stored = match update {
            Update::Full(fields) => session.replace_project(id, fields).await?,
            Update::Partial(_) if next == current => {
                debug!("Patch leaves project unchanged; skipping write");
                current
            }
            Update::Partial(patch) => session.merge_project(id, patch).await?,
        };
        debug_assert_eq!(stored, next, "store disagrees with resolved project");
        session.commit().await?;

        info!("Successfully updated project");
        Ok(stored)
    }
}
