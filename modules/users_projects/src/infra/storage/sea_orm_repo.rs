//! SeaORM-backed entity store implementation for the domain port.
//!
//! `SeaOrmStore` owns a cheap-to-clone `DatabaseConnection`; every
//! [`EntityStore::begin`] opens a `DatabaseTransaction` wrapped in a
//! [`SeaOrmSession`]. SeaORM rolls the transaction back when the session is
//! dropped without `commit`.

use anyhow::Context;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    SqlErr, TransactionTrait,
};

use crate::contract::model::{
    EntityKind, Project, ProjectFields, ProjectPatch, User, UserFields, UserPatch,
};
use crate::contract::patch::Patch;
use crate::domain::repo::{EntityStore, StoreError, StoreSession};
use crate::infra::storage::entity::{project, user};

/// SeaORM store impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
#[derive(Clone)]
pub struct SeaOrmStore {
    conn: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl EntityStore for SeaOrmStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        let tx = self
            .conn
            .begin()
            .await
            .context("begin transaction failed")?;
        Ok(Box::new(SeaOrmSession { tx }))
    }

    async fn begin_write(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        let tx = self
            .conn
            .begin()
            .await
            .context("begin transaction failed")?;
        if tx.get_database_backend() == DbBackend::Sqlite {
            // A deferred transaction that reads first cannot wait for the
            // write lock later and fails with SQLITE_BUSY. Opening with a
            // write takes the lock now, honouring busy_timeout.
            tx.execute_unprepared(SQLITE_TAKE_WRITE_LOCK)
                .await
                .context("acquire sqlite write lock failed")?;
        }
        Ok(Box::new(SeaOrmSession { tx }))
    }
}

/// Matches no rows but still opens a write transaction.
const SQLITE_TAKE_WRITE_LOCK: &str = "UPDATE users SET id = id WHERE 0";

/// A store session bound to one database transaction.
pub struct SeaOrmSession {
    tx: DatabaseTransaction,
}

impl SeaOrmSession {
    /// Add an exclusive row lock to `select`. SQLite has no row locks; there
    /// the lock taken by [`EntityStore::begin_write`] covers the whole
    /// database.
    fn for_update<E: EntityTrait>(&self, select: Select<E>) -> Select<E> {
        match self.tx.get_database_backend() {
            DbBackend::Sqlite => select,
            _ => select.lock_exclusive(),
        }
    }

    async fn find_user(&self, select: Select<user::Entity>, id: i32) -> Result<User, StoreError> {
        select
            .one(&self.tx)
            .await
            .context("find user failed")?
            .map(Into::into)
            .ok_or(StoreError::NotFound {
                kind: EntityKind::User,
                id,
            })
    }

    async fn find_project(
        &self,
        select: Select<project::Entity>,
        id: i32,
    ) -> Result<Project, StoreError> {
        select
            .one(&self.tx)
            .await
            .context("find project failed")?
            .map(Into::into)
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Project,
                id,
            })
    }

    /// Fail with `Conflict` when another user already holds `value` in `column`.
    async fn ensure_user_column_free(
        &self,
        column: user::Column,
        field: &'static str,
        value: &str,
        except: Option<i32>,
    ) -> Result<(), StoreError> {
        let mut query = user::Entity::find().filter(column.eq(value));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        let taken = query
            .count(&self.tx)
            .await
            .context("uniqueness check failed")?;
        if taken > 0 {
            return Err(StoreError::Conflict {
                field,
                value: value.to_owned(),
            });
        }
        Ok(())
    }

    async fn ensure_user_unique(
        &self,
        email: Option<&str>,
        student_id: Option<&str>,
        except: Option<i32>,
    ) -> Result<(), StoreError> {
        if let Some(email) = email {
            self.ensure_user_column_free(user::Column::Email, "email", email, except)
                .await?;
        }
        if let Some(student_id) = student_id {
            self.ensure_user_column_free(
                user::Column::StudentId,
                "student_id",
                student_id,
                except,
            )
            .await?;
        }
        Ok(())
    }
}

/// Map a failed user write. Unique violations that slipped past the
/// pre-check (a concurrent writer) still surface as `Conflict`.
fn user_write_error(
    err: DbErr,
    id: Option<i32>,
    email: Option<&str>,
    student_id: Option<&str>,
) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
        let (field, value) = if msg.contains("student_id") {
            ("student_id", student_id)
        } else {
            ("email", email)
        };
        return StoreError::Conflict {
            field,
            value: value.unwrap_or_default().to_owned(),
        };
    }
    write_error(err, EntityKind::User, id)
}

fn write_error(err: DbErr, kind: EntityKind, id: Option<i32>) -> StoreError {
    match (err, id) {
        (DbErr::RecordNotUpdated, Some(id)) => StoreError::NotFound { kind, id },
        (err, _) => {
            StoreError::Backend(anyhow::Error::new(err).context(format!("{kind} write failed")))
        }
    }
}

fn set_if_present<T>(slot: &mut sea_orm::ActiveValue<T>, patch: Patch<T>)
where
    T: Into<sea_orm::Value>,
{
    if let Patch::Set(v) = patch {
        *slot = Set(v);
    }
}

#[async_trait::async_trait]
impl StoreSession for SeaOrmSession {
    async fn create_user(&self, fields: UserFields) -> Result<User, StoreError> {
        self.ensure_user_unique(Some(&fields.email), Some(&fields.student_id), None)
            .await?;

        let m = user::ActiveModel {
            id: NotSet,
            name: Set(fields.name),
            email: Set(fields.email.clone()),
            age: Set(fields.age),
            student_id: Set(fields.student_id.clone()),
        };
        let created = m.insert(&self.tx).await.map_err(|e| {
            user_write_error(e, None, Some(&fields.email), Some(&fields.student_id))
        })?;
        Ok(created.into())
    }

    async fn get_user(&self, id: i32) -> Result<User, StoreError> {
        self.find_user(user::Entity::find_by_id(id), id).await
    }

    async fn get_user_for_update(&self, id: i32) -> Result<User, StoreError> {
        self.find_user(self.for_update(user::Entity::find_by_id(id)), id)
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.tx)
            .await
            .context("list users failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_user(&self, id: i32, fields: UserFields) -> Result<User, StoreError> {
        self.ensure_user_unique(Some(&fields.email), Some(&fields.student_id), Some(id))
            .await?;

        let m = user::ActiveModel {
            id: Unchanged(id),
            name: Set(fields.name),
            email: Set(fields.email.clone()),
            age: Set(fields.age),
            student_id: Set(fields.student_id.clone()),
        };
        let updated = m.update(&self.tx).await.map_err(|e| {
            user_write_error(e, Some(id), Some(&fields.email), Some(&fields.student_id))
        })?;
        Ok(updated.into())
    }

    async fn merge_user(&self, id: i32, patch: UserPatch) -> Result<User, StoreError> {
        let email = patch.email.as_set().cloned();
        let student_id = patch.student_id.as_set().cloned();
        self.ensure_user_unique(email.as_deref(), student_id.as_deref(), Some(id))
            .await?;

        // Only supplied columns are Set; everything else stays NotSet and is
        // left out of the UPDATE statement.
        let mut m = user::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        set_if_present(&mut m.name, patch.name);
        set_if_present(&mut m.email, patch.email);
        set_if_present(&mut m.age, patch.age);
        set_if_present(&mut m.student_id, patch.student_id);

        if !m.is_changed() {
            return self.get_user(id).await;
        }

        let updated = m.update(&self.tx).await.map_err(|e| {
            user_write_error(e, Some(id), email.as_deref(), student_id.as_deref())
        })?;
        Ok(updated.into())
    }

    async fn create_project(&self, fields: ProjectFields) -> Result<Project, StoreError> {
        let m = project::ActiveModel {
            id: NotSet,
            name: Set(fields.name),
            description: Set(fields.description),
            owner_id: Set(fields.owner_id),
        };
        let created = m
            .insert(&self.tx)
            .await
            .map_err(|e| write_error(e, EntityKind::Project, None))?;
        Ok(created.into())
    }

    async fn get_project(&self, id: i32) -> Result<Project, StoreError> {
        self.find_project(project::Entity::find_by_id(id), id).await
    }

    async fn get_project_for_update(&self, id: i32) -> Result<Project, StoreError> {
        self.find_project(self.for_update(project::Entity::find_by_id(id)), id)
            .await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let rows = project::Entity::find()
            .order_by_asc(project::Column::Id)
            .all(&self.tx)
            .await
            .context("list projects failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_project(
        &self,
        id: i32,
        fields: ProjectFields,
    ) -> Result<Project, StoreError> {
        let m = project::ActiveModel {
            id: Unchanged(id),
            name: Set(fields.name),
            description: Set(fields.description),
            owner_id: Set(fields.owner_id),
        };
        let updated = m
            .update(&self.tx)
            .await
            .map_err(|e| write_error(e, EntityKind::Project, Some(id)))?;
        Ok(updated.into())
    }

    async fn merge_project(&self, id: i32, patch: ProjectPatch) -> Result<Project, StoreError> {
        let mut m = project::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        set_if_present(&mut m.name, patch.name);
        set_if_present(&mut m.description, patch.description);
        set_if_present(&mut m.owner_id, patch.owner_id);

        if !m.is_changed() {
            return self.get_project(id).await;
        }

        let updated = m
            .update(&self.tx)
            .await
            .map_err(|e| write_error(e, EntityKind::Project, Some(id)))?;
        Ok(updated.into())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.context("commit failed")?;
        Ok(())
    }
}
