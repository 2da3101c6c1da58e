use serde::{Deserialize, Deserializer, Serialize};

use crate::contract::model::{
    Project, ProjectFields, ProjectPatch, User, UserFields, UserPatch,
};
use crate::contract::patch::Patch;

/// A present patch field always carries a value: deserializing `null` into
/// `Patch<String>` fails just like it would for `String`. Omitted fields never
/// reach this impl; `#[serde(default)]` turns them into `Patch::Absent`.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

// --- users ---

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub student_id: String,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserReq {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub student_id: String,
}

/// REST DTO for replacing a user (PUT): every field is required
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceUserReq {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub student_id: String,
}

/// REST DTO for patching a user (PATCH): every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchUserReq {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub age: Patch<i32>,
    #[serde(default)]
    pub student_id: Patch<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            student_id: user.student_id,
        }
    }
}

impl From<CreateUserReq> for UserFields {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            age: req.age,
            student_id: req.student_id,
        }
    }
}

impl From<ReplaceUserReq> for UserFields {
    fn from(req: ReplaceUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            age: req.age,
            student_id: req.student_id,
        }
    }
}

impl From<PatchUserReq> for UserPatch {
    fn from(req: PatchUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            age: req.age,
            student_id: req.student_id,
        }
    }
}

// --- projects ---

/// REST DTO for project representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub owner_id: i32,
}

/// REST DTO for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectReq {
    pub name: String,
    pub description: String,
    pub owner_id: i32,
}

/// REST DTO for replacing a project (PUT)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceProjectReq {
    pub name: String,
    pub description: String,
    pub owner_id: i32,
}

/// REST DTO for patching a project (PATCH)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchProjectReq {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub owner_id: Patch<i32>,
}

impl From<Project> for ProjectDto {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
        }
    }
}

impl From<CreateProjectReq> for ProjectFields {
    fn from(req: CreateProjectReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            owner_id: req.owner_id,
        }
    }
}

impl From<ReplaceProjectReq> for ProjectFields {
    fn from(req: ReplaceProjectReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            owner_id: req.owner_id,
        }
    }
}

impl From<PatchProjectReq> for ProjectPatch {
    fn from(req: PatchProjectReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            owner_id: req.owner_id,
        }
    }
}
