//! Next-state computation for PUT (full) and PATCH (partial) updates.
//!
//! The resolver is pure: it never touches the store. Payload completeness is
//! guaranteed by the request types, so resolving cannot fail.

use crate::contract::model::{Project, ProjectFields, ProjectPatch, User, UserFields, UserPatch};

/// How an update treats fields the payload does not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Replace every business field (PUT).
    Full,
    /// Overwrite only supplied fields (PATCH).
    Partial,
}

/// An update payload tagged with its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update<F, P> {
    Full(F),
    Partial(P),
}

impl<F, P> Update<F, P> {
    pub fn mode(&self) -> UpdateMode {
        match self {
            Self::Full(_) => UpdateMode::Full,
            Self::Partial(_) => UpdateMode::Partial,
        }
    }
}

pub type UserUpdate = Update<UserFields, UserPatch>;
pub type ProjectUpdate = Update<ProjectFields, ProjectPatch>;

/// Entities that can be rebuilt from a full or partial payload.
pub trait Resolvable: Sized {
    type Fields;
    type Patch;

    /// Server-assigned fields of `self` combined with `fields`.
    fn replaced(&self, fields: &Self::Fields) -> Self;
    /// `self` with only the supplied fields of `patch` overwritten.
    fn merged(&self, patch: &Self::Patch) -> Self;
}

impl Resolvable for User {
    type Fields = UserFields;
    type Patch = UserPatch;

    fn replaced(&self, fields: &UserFields) -> Self {
        Self {
            id: self.id,
            name: fields.name.clone(),
            email: fields.email.clone(),
            age: fields.age,
            student_id: fields.student_id.clone(),
        }
    }

    fn merged(&self, patch: &UserPatch) -> Self {
        Self {
            id: self.id,
            name: patch.name.resolve(&self.name),
            email: patch.email.resolve(&self.email),
            age: patch.age.resolve(&self.age),
            student_id: patch.student_id.resolve(&self.student_id),
        }
    }
}

impl Resolvable for Project {
    type Fields = ProjectFields;
    type Patch = ProjectPatch;

    fn replaced(&self, fields: &ProjectFields) -> Self {
        Self {
            id: self.id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            owner_id: fields.owner_id,
        }
    }

    fn merged(&self, patch: &ProjectPatch) -> Self {
        Self {
            id: self.id,
            name: patch.name.resolve(&self.name),
            description: patch.description.resolve(&self.description),
            owner_id: patch.owner_id.resolve(&self.owner_id),
        }
    }
}

/// Compute the state `existing` will have once `update` is applied.
pub fn resolve<E: Resolvable>(existing: &E, update: &Update<E::Fields, E::Patch>) -> E {
    match update {
        Update::Full(fields) => existing.replaced(fields),
        Update::Partial(patch) => existing.merged(patch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::patch::Patch;

    fn bob() -> User {
        User {
            id: 7,
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            age: 22,
            student_id: "S2222222".to_string(),
        }
    }

    fn rtos() -> Project {
        Project {
            id: 3,
            name: "RTOS".to_string(),
            description: "RTOS mini project".to_string(),
            owner_id: 7,
        }
    }

    #[test]
    fn full_update_overwrites_every_field_and_keeps_id() {
        let fields = UserFields {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            age: 24,
            student_id: "S2222222".to_string(),
        };
        let next = resolve(&bob(), &Update::Full(fields.clone()));
        assert_eq!(next.id, 7);
        assert_eq!(next.fields(), fields);
    }

    #[test]
    fn full_update_is_idempotent() {
        let update = Update::Full(UserFields {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            age: 24,
            student_id: "S9999999".to_string(),
        });
        let once = resolve(&bob(), &update);
        let twice = resolve(&once, &update);
        assert_eq!(once, twice);
    }

    #[test]
    fn partial_update_only_touches_supplied_fields() {
        let patch = UserPatch {
            email: Patch::Set("bobNew@example.com".to_string()),
            ..Default::default()
        };
        let next = resolve(&bob(), &Update::Partial(patch));
        assert_eq!(next.email, "bobNew@example.com");
        assert_eq!(next.name, "Bob");
        assert_eq!(next.age, 22);
        assert_eq!(next.student_id, "S2222222");
    }

    #[test]
    fn empty_partial_update_is_identity() {
        let next = resolve(&rtos(), &Update::Partial(ProjectPatch::default()));
        assert_eq!(next, rtos());
    }

    #[test]
    fn project_partial_update_changes_description_only() {
        let patch = ProjectPatch {
            description: Patch::Set("Embedded RTOS project".to_string()),
            ..Default::default()
        };
        let next = resolve(&rtos(), &Update::Partial(patch));
        assert_eq!(next.description, "Embedded RTOS project");
        assert_eq!(next.name, "RTOS");
        assert_eq!(next.owner_id, 7);
    }

    #[test]
    fn update_reports_its_mode() {
        let full: ProjectUpdate = Update::Full(rtos().fields());
        let partial: ProjectUpdate = Update::Partial(ProjectPatch::default());
        assert_eq!(full.mode(), UpdateMode::Full);
        assert_eq!(partial.mode(), UpdateMode::Partial);
    }
}
