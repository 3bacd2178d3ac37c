//! Property metadata and read access for entities.
//!
//! Rules and the audit helpers never touch entity fields directly; they go
//! through [`PropertyAccess`], which each entity implements with a `match`
//! over its property names.

use std::borrow::Cow;

use crate::error::CoreError;
use crate::value::FieldValue;

/// Audit sequence used when a property is audited without an explicit
/// position.
pub const DEFAULT_AUDIT_SEQUENCE: i32 = 999_999;

/// Declared property of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMeta {
    pub name: Cow<'static, str>,
    /// `Some` when the property takes part in audit listings.
    pub audit_sequence: Option<i32>,
}

impl PropertyMeta {
    /// A property that is not audited.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            audit_sequence: None,
        }
    }

    /// An audited property listed at `sequence`.
    pub const fn audited(name: &'static str, sequence: i32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            audit_sequence: Some(sequence),
        }
    }

    /// An audited property listed after all explicitly sequenced ones.
    pub const fn audited_default(name: &'static str) -> Self {
        Self::audited(name, DEFAULT_AUDIT_SEQUENCE)
    }

    /// A property whose name is only known at runtime.
    pub fn owned(name: impl Into<String>, audit_sequence: Option<i32>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            audit_sequence,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Read access to an entity's properties by name.
pub trait PropertyAccess {
    /// Declared properties, in declaration order.
    fn properties(&self) -> Cow<'_, [PropertyMeta]>;

    /// Current value of `name`, or `None` when the entity has no such
    /// property. A property that exists but holds no value is
    /// `Some(FieldValue::Null)`.
    fn property(&self, name: &str) -> Option<FieldValue>;

    /// Like [`property`](Self::property) but treats a missing property as a
    /// programmer error.
    fn require_property(&self, name: &str) -> Result<FieldValue, CoreError> {
        self.property(name)
            .ok_or_else(|| CoreError::UnknownProperty(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Point {
        x: i32,
    }

    const POINT_PROPERTIES: &[PropertyMeta] = &[PropertyMeta::audited("X", 1)];

    impl PropertyAccess for Point {
        fn properties(&self) -> Cow<'_, [PropertyMeta]> {
            Cow::Borrowed(POINT_PROPERTIES)
        }

        fn property(&self, name: &str) -> Option<FieldValue> {
            match name {
                "X" => Some(self.x.into()),
                _ => None,
            }
        }
    }

    #[test]
    fn require_property_reports_unknown_names() {
        let p = Point { x: 3 };
        assert_eq!(p.require_property("X").unwrap(), FieldValue::Int(3));
        assert_matches!(
            p.require_property("Y"),
            Err(CoreError::UnknownProperty(name)) if name == "Y"
        );
    }

    #[test]
    fn metadata_constructors() {
        assert_eq!(PropertyMeta::new("A").audit_sequence, None);
        assert_eq!(
            PropertyMeta::audited_default("A").audit_sequence,
            Some(DEFAULT_AUDIT_SEQUENCE)
        );
        assert_eq!(PropertyMeta::owned("B", Some(2)).name(), "B");
    }
}
