//! Three-state optional values for sparse edits.

use serde::{Serialize, Serializer};

/// An edit field that distinguishes "leave unchanged" from "explicitly
/// clear" from "set to a value".
///
/// `Option` cannot express this: a reorder request must be able to say
/// "move out of any category" (`Clear`) without every other request
/// implying the same. `Keep` fields are skipped when building wire diffs;
/// `Clear` serializes as JSON null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// The new value, treating `Clear` as absent.
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Keep | Self::Clear => None,
        }
    }

    #[must_use]
    pub const fn as_ref(&self) -> FieldUpdate<&T> {
        match self {
            Self::Keep => FieldUpdate::Keep,
            Self::Clear => FieldUpdate::Clear,
            Self::Set(value) => FieldUpdate::Set(value),
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            Self::Keep => FieldUpdate::Keep,
            Self::Clear => FieldUpdate::Clear,
            Self::Set(value) => FieldUpdate::Set(f(value)),
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Keep is normally skipped by the containing struct; a direct
            // serialization degrades to null.
            Self::Keep | Self::Clear => serializer.serialize_none(),
            Self::Set(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps() {
        let field: FieldUpdate<u64> = FieldUpdate::default();
        assert!(field.is_keep());
        assert!(!field.is_set());
    }

    #[test]
    fn test_value_treats_clear_as_absent() {
        assert_eq!(FieldUpdate::Set(5).value(), Some(5));
        assert_eq!(FieldUpdate::<u64>::Clear.value(), None);
        assert_eq!(FieldUpdate::<u64>::Keep.value(), None);
    }

    #[test]
    fn test_serializes_clear_as_null() {
        let clear: FieldUpdate<u64> = FieldUpdate::Clear;
        assert_eq!(serde_json::to_string(&clear).unwrap(), "null");
        assert_eq!(serde_json::to_string(&FieldUpdate::Set(5)).unwrap(), "5");
    }

    #[test]
    fn test_map_preserves_state() {
        assert_eq!(FieldUpdate::Set(2).map(|v| v * 2), FieldUpdate::Set(4));
        assert_eq!(FieldUpdate::<u64>::Clear.map(|v| v * 2), FieldUpdate::Clear);
    }
}
