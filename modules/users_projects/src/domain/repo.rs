use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::{
    EntityKind, Project, ProjectFields, ProjectPatch, User, UserFields, UserPatch,
};

/// Failures the entity store reports to the domain.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: i32 },

    #[error("unique constraint violated on {field}: '{value}'")]
    Conflict { field: &'static str, value: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Port for the domain layer: a handle able to open store sessions.
///
/// The handle is passed explicitly into the service; nothing in the domain
/// reaches for a process-wide connection.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Open a session backed by one storage transaction.
    async fn begin(&self) -> Result<Box<dyn StoreSession>, StoreError>;

    /// Open a session that will write. Concurrent write sessions wait for
    /// each other instead of failing, so requests against the same record
    /// run one after another.
    async fn begin_write(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        self.begin().await
    }
}

/// One unit of work against the store.
///
/// Mutations become durable on [`StoreSession::commit`]. Dropping a session
/// without committing discards every change made through it.
#[async_trait]
pub trait StoreSession: Send + Sync {
    /// Insert a user and return it with its newly assigned id.
    /// Fails with `Conflict` when email or student_id is already taken.
    async fn create_user(&self, fields: UserFields) -> Result<User, StoreError>;
    async fn get_user(&self, id: i32) -> Result<User, StoreError>;
    /// Like `get_user`, but holds an exclusive lock on the row where the
    /// backend supports row locks.
    async fn get_user_for_update(&self, id: i32) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    /// Overwrite every business field of the user.
    async fn replace_user(&self, id: i32, fields: UserFields) -> Result<User, StoreError>;
    /// Overwrite only the fields set in `patch`.
    async fn merge_user(&self, id: i32, patch: UserPatch) -> Result<User, StoreError>;

    async fn create_project(&self, fields: ProjectFields) -> Result<Project, StoreError>;
    async fn get_project(&self, id: i32) -> Result<Project, StoreError>;
    async fn get_project_for_update(&self, id: i32) -> Result<Project, StoreError>;
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn replace_project(&self, id: i32, fields: ProjectFields)
        -> Result<Project, StoreError>;
    async fn merge_project(&self, id: i32, patch: ProjectPatch) -> Result<Project, StoreError>;

    /// Make every change of this session durable.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
