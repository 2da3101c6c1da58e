//! Request validation: per-field shape checks and the owner reference check.

use tracing::debug;

use crate::contract::model::{EntityKind, ProjectFields, ProjectPatch, UserFields, UserPatch};
use crate::contract::patch::Patch;
use crate::domain::error::DomainError;
use crate::domain::repo::{StoreError, StoreSession};
use crate::domain::resolver::Update;

/// Field limits enforced on every payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub min_user_name_length: usize,
    pub max_user_name_length: usize,
    pub min_age: i32,
    pub max_age: i32,
    pub max_project_name_length: usize,
    pub max_description_length: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_user_name_length: 2,
            max_user_name_length: 50,
            min_age: 19,
            max_age: 120,
            max_project_name_length: 100,
            max_description_length: 300,
        }
    }
}

/// A request payload the validator knows how to check.
pub trait Payload {
    const KIND: EntityKind;

    /// Check every field the payload carries.
    fn check(&self, rules: &ValidationRules) -> Result<(), DomainError>;

    /// Owner reference carried by the payload, if any.
    fn owner_ref(&self) -> Option<i32> {
        None
    }
}

/// Stateless validator holding the configured rules.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn validate_create<P: Payload>(&self, payload: &P) -> Result<(), DomainError> {
        debug!(kind = %P::KIND, "Validating create payload");
        payload.check(&self.rules)
    }

    pub fn validate_update<F, P>(&self, update: &Update<F, P>) -> Result<(), DomainError>
    where
        F: Payload,
        P: Payload,
    {
        debug!(kind = %F::KIND, mode = ?update.mode(), "Validating update payload");
        match update {
            Update::Full(fields) => fields.check(&self.rules),
            Update::Partial(patch) => patch.check(&self.rules),
        }
    }
}

/// Owner referenced by an update, whichever mode it uses.
pub fn update_owner_ref<F: Payload, P: Payload>(update: &Update<F, P>) -> Option<i32> {
    match update {
        Update::Full(fields) => fields.owner_ref(),
        Update::Partial(patch) => patch.owner_ref(),
    }
}

/// Resolve `owner_id` through the session.
///
/// A missing owner is bad input, so it surfaces as a validation error on
/// `owner_id` rather than as a not-found.
pub async fn ensure_owner_exists(
    session: &dyn StoreSession,
    owner_id: i32,
) -> Result<(), DomainError> {
    match session.get_user(owner_id).await {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound { .. }) => Err(DomainError::validation(
            "owner_id",
            format!("User {owner_id} does not exist"),
        )),
        Err(e) => Err(e.into()),
    }
}

// --- field checks ---

fn check_user_name(name: &str, rules: &ValidationRules) -> Result<(), DomainError> {
    let len = name.trim().chars().count();
    if len < rules.min_user_name_length || len > rules.max_user_name_length {
        return Err(DomainError::validation(
            "name",
            format!(
                "must be between {} and {} characters",
                rules.min_user_name_length, rules.max_user_name_length
            ),
        ));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), DomainError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(
            "email",
            format!("'{email}' is not a valid email address"),
        ));
    }
    Ok(())
}

fn check_age(age: i32, rules: &ValidationRules) -> Result<(), DomainError> {
    if age < rules.min_age || age > rules.max_age {
        return Err(DomainError::validation(
            "age",
            format!("must be between {} and {}", rules.min_age, rules.max_age),
        ));
    }
    Ok(())
}

fn check_student_id(student_id: &str) -> Result<(), DomainError> {
    let valid = student_id
        .strip_prefix('S')
        .is_some_and(|digits| digits.len() == 7 && digits.bytes().all(|b| b.is_ascii_digit()));
    if !valid {
        return Err(DomainError::validation(
            "student_id",
            "must be 'S' followed by 7 digits",
        ));
    }
    Ok(())
}

fn check_project_name(name: &str, rules: &ValidationRules) -> Result<(), DomainError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(DomainError::validation("name", "must not be empty"));
    }
    if len > rules.max_project_name_length {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {} characters", rules.max_project_name_length),
        ));
    }
    Ok(())
}

fn check_description(description: &str, rules: &ValidationRules) -> Result<(), DomainError> {
    if description.chars().count() > rules.max_description_length {
        return Err(DomainError::validation(
            "description",
            format!("must be at most {} characters", rules.max_description_length),
        ));
    }
    Ok(())
}

fn check_owner_id(owner_id: i32) -> Result<(), DomainError> {
    if owner_id <= 0 {
        return Err(DomainError::validation(
            "owner_id",
            "must be a positive user id",
        ));
    }
    Ok(())
}

/// Run `check` only when the patch supplies a value.
fn check_set<T>(
    field: &Patch<T>,
    check: impl FnOnce(&T) -> Result<(), DomainError>,
) -> Result<(), DomainError> {
    match field.as_set() {
        Some(v) => check(v),
        None => Ok(()),
    }
}

impl Payload for UserFields {
    const KIND: EntityKind = EntityKind::User;

    fn check(&self, rules: &ValidationRules) -> Result<(), DomainError> {
        check_user_name(&self.name, rules)?;
        check_email(&self.email)?;
        check_age(self.age, rules)?;
        check_student_id(&self.student_id)
    }
}

impl Payload for UserPatch {
    const KIND: EntityKind = EntityKind::User;

    fn check(&self, rules: &ValidationRules) -> Result<(), DomainError> {
        check_set(&self.name, |v| check_user_name(v, rules))?;
        check_set(&self.email, |v| check_email(v))?;
        check_set(&self.age, |v| check_age(*v, rules))?;
        check_set(&self.student_id, |v| check_student_id(v))
    }
}

impl Payload for ProjectFields {
    const KIND: EntityKind = EntityKind::Project;

    fn check(&self, rules: &ValidationRules) -> Result<(), DomainError> {
        check_project_name(&self.name, rules)?;
        check_description(&self.description, rules)?;
        check_owner_id(self.owner_id)
    }

    fn owner_ref(&self) -> Option<i32> {
        Some(self.owner_id)
    }
}

impl Payload for ProjectPatch {
    const KIND: EntityKind = EntityKind::Project;

    fn check(&self, rules: &ValidationRules) -> Result<(), DomainError> {
        check_set(&self.name, |v| check_project_name(v, rules))?;
        check_set(&self.description, |v| check_description(v, rules))?;
        check_set(&self.owner_id, |v| check_owner_id(*v))
    }

    fn owner_ref(&self) -> Option<i32> {
        self.owner_id.as_set().copied()
    }
}
