//! Field metadata.

use crate::types::ScalarKind;

/// Metadata about a single entity field.
///
/// Instances are `const`-built, normally by the `#[derive(Entity)]` macro,
/// and live in a `'static` slice per entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Rust field name
    pub name: &'static str,
    /// Database column name (may differ from the field name)
    pub column: &'static str,
    /// Underlying scalar kind of the stored column
    pub scalar: ScalarKind,
    /// Whether this field is the primary key
    pub primary_key: bool,
    /// Whether this field allows NULL
    pub nullable: bool,
    /// Whether this field represents a relation rather than a stored column.
    ///
    /// Virtual fields are excluded from generated column lists and from
    /// value extraction for INSERT/UPDATE.
    pub virtual_: bool,
}

impl FieldInfo {
    /// Create field info with the required data.
    pub const fn new(name: &'static str, column: &'static str, scalar: ScalarKind) -> Self {
        Self {
            name,
            column,
            scalar,
            primary_key: false,
            nullable: false,
            virtual_: false,
        }
    }

    /// Set the primary key flag.
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set the nullable flag.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set the virtual flag.
    pub const fn virtual_(mut self, value: bool) -> Self {
        self.virtual_ = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_builder_chain() {
        static FIELD: FieldInfo =
            FieldInfo::new("id", "id", ScalarKind::BigInt).primary_key(true);
        assert!(FIELD.primary_key);
        assert!(!FIELD.virtual_);
        assert_eq!(FIELD.column, "id");
    }

    #[test]
    fn test_defaults() {
        let f = FieldInfo::new("name", "name", ScalarKind::Text);
        assert!(!f.primary_key);
        assert!(!f.nullable);
        assert!(!f.virtual_);
    }
}
