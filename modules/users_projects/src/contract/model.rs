use std::fmt;

use crate::contract::patch::Patch;

/// Which record family an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Project,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("User"),
            Self::Project => f.write_str("Project"),
        }
    }
}

/// Pure user model (no serde); the REST layer owns the wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub student_id: String,
}

/// Every business field of a user. Used for creation and full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub student_id: String,
}

/// Partial update data for a user; absent fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub name: Patch<String>,
    pub email: Patch<String>,
    pub age: Patch<i32>,
    pub student_id: Patch<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_absent()
            && self.email.is_absent()
            && self.age.is_absent()
            && self.student_id.is_absent()
    }
}

impl User {
    pub fn fields(&self) -> UserFields {
        UserFields {
            name: self.name.clone(),
            email: self.email.clone(),
            age: self.age,
            student_id: self.student_id.clone(),
        }
    }
}

/// Pure project model. `owner_id` references `User::id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub owner_id: i32,
}

/// Every business field of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFields {
    pub name: String,
    pub description: String,
    pub owner_id: i32,
}

/// Partial update data for a project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectPatch {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub owner_id: Patch<i32>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_absent() && self.description.is_absent() && self.owner_id.is_absent()
    }
}

impl Project {
    pub fn fields(&self) -> ProjectFields {
        ProjectFields {
            name: self.name.clone(),
            description: self.description.clone(),
            owner_id: self.owner_id,
        }
    }
}
