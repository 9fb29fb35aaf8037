//! The `Entity` trait, extracted schemas, and the schema registry.

use crate::error::{Error, Result, SchemaErrorKind};
use crate::field::FieldInfo;
use crate::relation::{RelationDef, RelationDescriptor, resolve};
use crate::value::Value;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock, RwLock};

/// Trait for typed records mapped to a table.
///
/// Normally implemented via `#[derive(Entity)]`, which generates the static
/// metadata and the checked per-field binding from the record's shape and
/// `#[entity(...)]` overrides. Hand-written implementations are possible and
/// are re-validated at extraction time.
pub trait Entity: Sized + Default + Send + Sync + 'static {
    /// The table this entity maps to.
    const TABLE: &'static str;

    /// The named connection this entity executes against.
    const CONNECTION: &'static str = "default";

    /// Declared relations, before convention resolution.
    const RELATIONS: &'static [RelationDef] = &[];

    /// Field metadata, in declaration order.
    fn fields() -> &'static [FieldInfo];

    /// Column/value pairs for the stored (non-virtual) fields, in
    /// declaration order.
    fn column_values(&self) -> Vec<(&'static str, Value)>;

    /// Apply one result column to this record.
    ///
    /// A column matches when it equals a field's column name, or
    /// `<table>.<column>` for this entity's own table. Columns qualified
    /// with a related table are offered to nested relation fields, one
    /// level deep. Returns `Ok(false)` when nothing matched (the binder
    /// ignores such columns), and a bind error when a matching field
    /// rejects the value.
    fn bind_column(&mut self, column: &str, value: &Value) -> Result<bool>;

    /// The primary key value, or [`Value::Null`] when the entity declares
    /// no primary key or the field is unset.
    fn primary_key_value(&self) -> Value;
}

/// The extracted, immutable schema of one entity type.
///
/// Created lazily once per type and cached in a [`SchemaRegistry`]; never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Table name.
    pub table: &'static str,
    /// Named connection this entity executes against.
    pub connection: &'static str,
    /// Field metadata in declaration order.
    pub fields: &'static [FieldInfo],
    /// Resolved relations, keyed by related table name.
    pub relations: BTreeMap<&'static str, RelationDescriptor>,
}

impl EntitySchema {
    /// Build and validate the schema for an entity type.
    ///
    /// Fails on more than one primary-key field and on unresolvable
    /// relation declarations (e.g. a BelongsToMany without a junction
    /// table). A zero-primary-key entity extracts fine; operations that
    /// need the key fail later with a distinct error.
    pub fn try_extract<E: Entity>() -> Result<Self> {
        let fields = E::fields();

        let pk_count = fields.iter().filter(|f| f.primary_key).count();
        if pk_count > 1 {
            return Err(Error::schema(
                SchemaErrorKind::AmbiguousPrimaryKey,
                format!(
                    "entity for table '{}' marks {} fields as primary key",
                    E::TABLE,
                    pk_count
                ),
            ));
        }

        let mut relations = BTreeMap::new();
        for def in E::RELATIONS {
            let descriptor = resolve(E::TABLE, def)?;
            relations.insert(def.related_table, descriptor);
        }

        tracing::debug!(
            table = E::TABLE,
            fields = fields.len(),
            relations = relations.len(),
            "extracted entity schema"
        );

        Ok(Self {
            table: E::TABLE,
            connection: E::CONNECTION,
            fields,
            relations,
        })
    }

    /// The primary-key field, if one is declared.
    pub fn primary_key(&self) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Stored (non-virtual) column names in declaration order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| !f.virtual_)
            .map(|f| f.column)
            .collect()
    }

    /// Look up the resolved relation towards a table.
    pub fn relation(&self, related_table: &str) -> Option<&RelationDescriptor> {
        self.relations.get(related_table)
    }
}

/// Process-wide cache of extracted schemas, keyed by entity type identity.
///
/// Population is lazy and guarded: concurrent first use of a type runs
/// extraction exactly once (double-checked under the write lock); later
/// reads only take the uncontended read lock. The registry is an ordinary
/// value type so tests can construct their own instead of sharing the
/// process-wide default.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    cache: RwLock<HashMap<TypeId, Arc<EntitySchema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// The cached schema for an entity type, extracting it on first use.
    ///
    /// # Panics
    ///
    /// Panics when the entity definition is invalid (ambiguous primary key,
    /// unresolvable relation). These are programmer errors surfaced at the
    /// first use of the misconfigured type; use
    /// [`EntitySchema::try_extract`] to observe the error value instead.
    pub fn schema_of<E: Entity>(&self) -> Arc<EntitySchema> {
        let key = TypeId::of::<E>();

        if let Some(schema) = self
            .cache
            .read()
            .expect("schema registry poisoned")
            .get(&key)
        {
            return Arc::clone(schema);
        }

        let mut cache = self.cache.write().expect("schema registry poisoned");
        // Re-check: another thread may have extracted while we waited.
        if let Some(schema) = cache.get(&key) {
            return Arc::clone(schema);
        }

        let schema = EntitySchema::try_extract::<E>().unwrap_or_else(|e| {
            panic!(
                "invalid entity definition for type {}: {e}",
                std::any::type_name::<E>()
            )
        });
        let schema = Arc::new(schema);
        cache.insert(key, Arc::clone(&schema));
        schema
    }

    /// Drop every cached schema. Intended for tests.
    pub fn clear(&self) {
        self.cache
            .write()
            .expect("schema registry poisoned")
            .clear();
    }
}

/// The cached schema for an entity type, from the process-wide registry.
pub fn schema_of<E: Entity>() -> Arc<EntitySchema> {
    SchemaRegistry::global().schema_of::<E>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RelationKind;
    use crate::types::ScalarKind;

    #[derive(Debug, Default)]
    struct Post {
        id: i64,
        title: String,
    }

    impl Entity for Post {
        const TABLE: &'static str = "posts";
        const RELATIONS: &'static [RelationDef] =
            &[RelationDef::new("comments", "comments", RelationKind::HasMany)];

        fn fields() -> &'static [FieldInfo] {
            static FIELDS: &[FieldInfo] = &[
                FieldInfo::new("id", "id", ScalarKind::BigInt).primary_key(true),
                FieldInfo::new("title", "title", ScalarKind::Text),
                FieldInfo::new("comments", "comments", ScalarKind::Text).virtual_(true),
            ];
            FIELDS
        }

        fn column_values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", Value::from(self.id)),
                ("title", Value::from(self.title.clone())),
            ]
        }

        fn bind_column(&mut self, column: &str, value: &Value) -> Result<bool> {
            match column {
                "id" => {
                    self.id = crate::binder::bind_value(column, value)?;
                    Ok(true)
                }
                "title" => {
                    self.title = crate::binder::bind_value(column, value)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        fn primary_key_value(&self) -> Value {
            Value::from(self.id)
        }
    }

    #[derive(Debug, Default)]
    struct TwoKeys;

    impl Entity for TwoKeys {
        const TABLE: &'static str = "two_keys";

        fn fields() -> &'static [FieldInfo] {
            static FIELDS: &[FieldInfo] = &[
                FieldInfo::new("a", "a", ScalarKind::BigInt).primary_key(true),
                FieldInfo::new("b", "b", ScalarKind::BigInt).primary_key(true),
            ];
            FIELDS
        }

        fn column_values(&self) -> Vec<(&'static str, Value)> {
            vec![]
        }

        fn bind_column(&mut self, _column: &str, _value: &Value) -> Result<bool> {
            Ok(false)
        }

        fn primary_key_value(&self) -> Value {
            Value::Null
        }
    }

    #[derive(Debug, Default)]
    struct NoKey {
        label: String,
    }

    impl Entity for NoKey {
        const TABLE: &'static str = "audit";

        fn fields() -> &'static [FieldInfo] {
            static FIELDS: &[FieldInfo] = &[FieldInfo::new("label", "label", ScalarKind::Text)];
            FIELDS
        }

        fn column_values(&self) -> Vec<(&'static str, Value)> {
            vec![("label", Value::from(self.label.clone()))]
        }

        fn bind_column(&mut self, _column: &str, _value: &Value) -> Result<bool> {
            Ok(false)
        }

        fn primary_key_value(&self) -> Value {
            Value::Null
        }
    }

    #[test]
    fn test_extract_resolves_relations() {
        let schema = EntitySchema::try_extract::<Post>().unwrap();
        assert_eq!(schema.table, "posts");
        assert_eq!(schema.connection, "default");
        assert_eq!(schema.columns(), vec!["id", "title"]);
        assert_eq!(schema.primary_key().unwrap().column, "id");

        let rel = schema.relation("comments").unwrap();
        assert_eq!(
            rel,
            &RelationDescriptor::HasMany {
                related_table: "comments",
                foreign_key: "post_id".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_rejects_two_primary_keys() {
        let err = EntitySchema::try_extract::<TwoKeys>().unwrap_err();
        match err {
            Error::Schema(se) => assert_eq!(se.kind, SchemaErrorKind::AmbiguousPrimaryKey),
            other => panic!("expected schema error, got {other}"),
        }
    }

    #[test]
    #[should_panic(expected = "invalid entity definition")]
    fn test_registry_panics_on_ambiguous_primary_key() {
        let registry = SchemaRegistry::new();
        let _ = registry.schema_of::<TwoKeys>();
    }

    #[test]
    fn test_zero_primary_key_extracts() {
        let schema = EntitySchema::try_extract::<NoKey>().unwrap();
        assert!(schema.primary_key().is_none());
    }

    #[test]
    fn test_registry_caches_and_is_idempotent() {
        let registry = SchemaRegistry::new();
        let first = registry.schema_of::<Post>();
        let second = registry.schema_of::<Post>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.fields, second.fields);

        registry.clear();
        let third = registry.schema_of::<Post>();
        assert!(!Arc::ptr_eq(&first, &third));
        // Field-for-field equal after a reset.
        assert_eq!(first.fields, third.fields);
        assert_eq!(first.relations, third.relations);
    }

    #[test]
    fn test_concurrent_first_use_extracts_once() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.schema_of::<Post>())
            })
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in schemas.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }
}
