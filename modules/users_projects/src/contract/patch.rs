//! Presence-aware field wrapper for partial updates.
//!
//! A PATCH payload must tell "field omitted" apart from "field supplied".
//! `Option<T>` conflates omission with an explicit `null`; `Patch<T>` has no
//! null state at all, so a supplied field always carries a value.

/// A single mutable field of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// The payload did not mention the field.
    #[default]
    Absent,
    /// The payload supplied a new value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(v) => Some(v),
            Self::Absent => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Set(v) => Some(v),
            Self::Absent => None,
        }
    }

    /// Value after applying the patch on top of `current`.
    pub fn resolve(&self, current: &T) -> T
    where
        T: Clone,
    {
        match self {
            Self::Set(v) => v.clone(),
            Self::Absent => current.clone(),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keeps_current_value() {
        let p: Patch<String> = Patch::Absent;
        assert_eq!(p.resolve(&"Bob".to_string()), "Bob");
        assert!(p.is_absent());
        assert_eq!(p.as_set(), None);
    }

    #[test]
    fn set_overrides_current_value() {
        let p = Patch::Set(24);
        assert_eq!(p.resolve(&22), 24);
        assert!(p.is_set());
        assert_eq!(p.into_option(), Some(24));
    }

    #[test]
    fn default_is_absent() {
        assert_eq!(Patch::<i32>::default(), Patch::Absent);
        assert_eq!(Patch::from(None::<i32>), Patch::Absent);
        assert_eq!(Patch::from(Some(1)), Patch::Set(1));
    }
}
