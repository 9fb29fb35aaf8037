//! Relation metadata: declarations, resolution, and resolved descriptors.
//!
//! Relations are declared at compile time (normally via the derive macro) as
//! static [`RelationDef`] entries on each entity. Schema extraction resolves
//! every declaration into a [`RelationDescriptor`] by filling unset pieces
//! from the naming convention `<singularized-table>_id`.

use crate::error::{Error, Result, SchemaErrorKind};
use crate::field::FieldInfo;
use crate::naming;

/// The kind of a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// One related row carrying this entity's key: `User` has one `Address`.
    HasOne,
    /// Many related rows carrying this entity's key: `Post` has many `Comment`s.
    HasMany,
    /// This entity carries the related row's key: `Comment` belongs to `Post`.
    BelongsTo,
    /// Many-to-many through a junction table: `Post` belongs to many `Category`s.
    BelongsToMany,
}

impl RelationKind {
    /// Human-readable kind name for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationKind::HasOne => "has-one",
            RelationKind::HasMany => "has-many",
            RelationKind::BelongsTo => "belongs-to",
            RelationKind::BelongsToMany => "belongs-to-many",
        }
    }
}

/// A declared relation on an entity, before convention resolution.
///
/// Every override is optional; whatever the author leaves unset is derived
/// from table names during schema extraction. The related entity's field
/// metadata is reachable through a function pointer so declarations stay
/// `'static` and allocation-free even across mutually related entities.
#[derive(Debug, Clone, Copy)]
pub struct RelationDef {
    /// Name of the relation field on the declaring entity.
    pub name: &'static str,
    /// The related entity's table name.
    pub related_table: &'static str,
    /// Relation kind.
    pub kind: RelationKind,
    /// HasOne/HasMany: foreign-key column on the related table.
    pub foreign_key: Option<&'static str>,
    /// BelongsTo: key column on the declaring entity.
    pub local_key: Option<&'static str>,
    /// BelongsTo: key column on the related table (defaults to its primary key).
    pub related_key: Option<&'static str>,
    /// BelongsToMany: junction table name. Required, never inferred.
    pub junction_table: Option<&'static str>,
    /// BelongsToMany: junction column pointing at the declaring entity.
    pub junction_owner_key: Option<&'static str>,
    /// BelongsToMany: junction column pointing at the related entity.
    pub junction_related_key: Option<&'static str>,
    /// Function pointer returning the related entity's field metadata.
    pub related_fields_fn: fn() -> &'static [FieldInfo],
}

impl RelationDef {
    fn no_related_fields() -> &'static [FieldInfo] {
        &[]
    }

    /// Create a relation declaration with the required pieces.
    #[must_use]
    pub const fn new(
        name: &'static str,
        related_table: &'static str,
        kind: RelationKind,
    ) -> Self {
        Self {
            name,
            related_table,
            kind,
            foreign_key: None,
            local_key: None,
            related_key: None,
            junction_table: None,
            junction_owner_key: None,
            junction_related_key: None,
            related_fields_fn: Self::no_related_fields,
        }
    }

    /// Override the foreign-key column on the related table.
    #[must_use]
    pub const fn foreign_key(mut self, key: &'static str) -> Self {
        self.foreign_key = Some(key);
        self
    }

    /// Override the key column on the declaring entity (BelongsTo).
    #[must_use]
    pub const fn local_key(mut self, key: &'static str) -> Self {
        self.local_key = Some(key);
        self
    }

    /// Override the key column on the related table.
    #[must_use]
    pub const fn related_key(mut self, key: &'static str) -> Self {
        self.related_key = Some(key);
        self
    }

    /// Set the junction table name (BelongsToMany).
    #[must_use]
    pub const fn junction_table(mut self, table: &'static str) -> Self {
        self.junction_table = Some(table);
        self
    }

    /// Override the junction column pointing at the declaring entity.
    #[must_use]
    pub const fn junction_owner_key(mut self, key: &'static str) -> Self {
        self.junction_owner_key = Some(key);
        self
    }

    /// Override the junction column pointing at the related entity.
    #[must_use]
    pub const fn junction_related_key(mut self, key: &'static str) -> Self {
        self.junction_related_key = Some(key);
        self
    }

    /// Provide the related entity's `fields()` function pointer.
    #[must_use]
    pub const fn related_fields(mut self, f: fn() -> &'static [FieldInfo]) -> Self {
        self.related_fields_fn = f;
        self
    }
}

/// A fully resolved relation: every key column is known.
///
/// A closed union over the four kinds, each carrying only what its join
/// needs. Key columns are owned strings because convention-derived names are
/// computed at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationDescriptor {
    HasOne {
        related_table: &'static str,
        /// Column on the related table holding the owner's primary key.
        foreign_key: String,
    },
    HasMany {
        related_table: &'static str,
        /// Column on the related table holding the owner's primary key.
        foreign_key: String,
    },
    BelongsTo {
        related_table: &'static str,
        /// Column on the declaring entity holding the related row's key.
        local_key: String,
        /// Key column on the related table.
        related_key: String,
    },
    BelongsToMany {
        related_table: &'static str,
        junction_table: &'static str,
        /// Junction column pointing at the declaring entity.
        junction_owner_key: String,
        /// Junction column pointing at the related entity.
        junction_related_key: String,
        /// Key column on the related table the junction points at.
        related_key: String,
    },
}

impl RelationDescriptor {
    /// The related entity's table name.
    pub fn related_table(&self) -> &'static str {
        match self {
            RelationDescriptor::HasOne { related_table, .. }
            | RelationDescriptor::HasMany { related_table, .. }
            | RelationDescriptor::BelongsTo { related_table, .. }
            | RelationDescriptor::BelongsToMany { related_table, .. } => related_table,
        }
    }

    /// The kind this descriptor was resolved from.
    pub fn kind(&self) -> RelationKind {
        match self {
            RelationDescriptor::HasOne { .. } => RelationKind::HasOne,
            RelationDescriptor::HasMany { .. } => RelationKind::HasMany,
            RelationDescriptor::BelongsTo { .. } => RelationKind::BelongsTo,
            RelationDescriptor::BelongsToMany { .. } => RelationKind::BelongsToMany,
        }
    }
}

/// Primary-key column of a field list, if one is declared.
fn primary_key_column(fields: &[FieldInfo]) -> Option<&'static str> {
    fields.iter().find(|f| f.primary_key).map(|f| f.column)
}

/// Resolve a declared relation against its owner's table name.
///
/// Overrides are taken as-is; anything unset falls back to the
/// `<singularized-table>_id` convention. A BelongsToMany declaration without
/// a junction table fails here — the junction name is never guessed.
pub fn resolve(owner_table: &str, def: &RelationDef) -> Result<RelationDescriptor> {
    let related_fields = (def.related_fields_fn)();

    match def.kind {
        RelationKind::HasOne => Ok(RelationDescriptor::HasOne {
            related_table: def.related_table,
            foreign_key: def
                .foreign_key
                .map_or_else(|| naming::foreign_key_for(owner_table), str::to_string),
        }),
        RelationKind::HasMany => Ok(RelationDescriptor::HasMany {
            related_table: def.related_table,
            foreign_key: def
                .foreign_key
                .map_or_else(|| naming::foreign_key_for(owner_table), str::to_string),
        }),
        RelationKind::BelongsTo => Ok(RelationDescriptor::BelongsTo {
            related_table: def.related_table,
            local_key: def.local_key.map_or_else(
                || naming::foreign_key_for(def.related_table),
                str::to_string,
            ),
            related_key: def
                .related_key
                .or_else(|| primary_key_column(related_fields))
                .unwrap_or("id")
                .to_string(),
        }),
        RelationKind::BelongsToMany => {
            let junction_table = def.junction_table.ok_or_else(|| {
                Error::schema(
                    SchemaErrorKind::MissingJunctionTable,
                    format!(
                        "belongs-to-many relation '{}' towards '{}' declares no junction table",
                        def.name, def.related_table
                    ),
                )
            })?;
            Ok(RelationDescriptor::BelongsToMany {
                related_table: def.related_table,
                junction_table,
                junction_owner_key: def
                    .junction_owner_key
                    .map_or_else(|| naming::foreign_key_for(owner_table), str::to_string),
                junction_related_key: def.junction_related_key.map_or_else(
                    || naming::foreign_key_for(def.related_table),
                    str::to_string,
                ),
                related_key: def
                    .related_key
                    .or_else(|| primary_key_column(related_fields))
                    .unwrap_or("id")
                    .to_string(),
            })
        }
    }
}
