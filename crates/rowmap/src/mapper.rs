//! The mapper facade: builders in, executor out, bound records back.

use rowmap_core::{
    Entity, Error, Executor, RelationDescriptor, RelationErrorKind, Result, SchemaErrorKind,
    Value, bind_all, bind_first, schema_of,
};
use rowmap_query::{
    Cond, Delete, Dialect, Insert, Select, Update, junction_select, related_by_keys_select,
    relation_select,
};
use std::collections::HashMap;

struct Connection {
    dialect: Dialect,
    executor: Box<dyn Executor + Send + Sync>,
}

/// Ties the engine together: named connections with their dialect, the
/// statement builders, and the row binder.
///
/// A connection's dialect is fixed at registration and threaded through
/// every statement built against it. Entities pick their connection by name
/// (`#[entity(connection = "...")]`, defaulting to `"default"`).
#[derive(Default)]
pub struct Mapper {
    connections: HashMap<String, Connection>,
}

impl Mapper {
    /// Create a mapper with no connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named connection.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        dialect: Dialect,
        executor: impl Executor + Send + Sync + 'static,
    ) {
        self.connections.insert(
            name.into(),
            Connection {
                dialect,
                executor: Box::new(executor),
            },
        );
    }

    fn connection(&self, name: &str) -> Result<&Connection> {
        self.connections.get(name).ok_or_else(|| {
            Error::schema(
                SchemaErrorKind::UnknownConnection,
                format!("no connection registered under '{}'", name),
            )
        })
    }

    fn connection_for<E: Entity>(&self) -> Result<&Connection> {
        self.connection(E::CONNECTION)
    }

    /// Fetch every row of an entity's table.
    pub fn find_all<E: Entity>(&self) -> Result<Vec<E>> {
        let conn = self.connection_for::<E>()?;
        let select = Select::from_schema(&schema_of::<E>(), conn.dialect);
        self.fetch(conn, &select)
    }

    /// Fetch the rows matching a condition.
    pub fn find_where<E: Entity>(&self, cond: Cond) -> Result<Vec<E>> {
        let conn = self.connection_for::<E>()?;
        let select = Select::from_schema(&schema_of::<E>(), conn.dialect).filter(cond);
        self.fetch(conn, &select)
    }

    /// Fetch the first row matching a condition.
    pub fn find_one<E: Entity>(&self, cond: Cond) -> Result<Option<E>> {
        let conn = self.connection_for::<E>()?;
        let select = Select::from_schema(&schema_of::<E>(), conn.dialect)
            .filter(cond)
            .limit(1);
        let (sql, args) = select.build(conn.dialect)?;
        let rows = conn.executor.query(&sql, &args)?;
        bind_first(&rows)
    }

    /// Fetch an entity by its primary key.
    pub fn get<E: Entity>(&self, key: impl Into<Value>) -> Result<Option<E>> {
        let schema = schema_of::<E>();
        let pk = schema.primary_key().ok_or_else(|| {
            Error::schema(
                SchemaErrorKind::MissingPrimaryKey,
                format!("entity for table '{}' declares no primary key", E::TABLE),
            )
        })?;
        self.find_one(Cond::eq(pk.column, key.into()))
    }

    /// Run a caller-built SELECT and bind its rows.
    pub fn query_as<E: Entity>(&self, select: &Select) -> Result<Vec<E>> {
        let conn = self.connection_for::<E>()?;
        self.fetch(conn, select)
    }

    /// Insert a record; returns the affected count or last insert id,
    /// whatever the executor reports.
    pub fn insert<E: Entity>(&self, record: &E) -> Result<u64> {
        let conn = self.connection_for::<E>()?;
        let (sql, args) = Insert::from_entity(record).build(conn.dialect)?;
        tracing::debug!(table = E::TABLE, sql = %sql, "executing INSERT");
        conn.executor.execute(&sql, &args)
    }

    /// Update a record's stored fields, keyed by its primary key.
    pub fn update<E: Entity>(&self, record: &E) -> Result<u64> {
        let conn = self.connection_for::<E>()?;
        let (sql, args) = Update::from_entity(record)?.build(conn.dialect)?;
        tracing::debug!(table = E::TABLE, sql = %sql, "executing UPDATE");
        conn.executor.execute(&sql, &args)
    }

    /// Delete a record, keyed by its primary key.
    pub fn delete<E: Entity>(&self, record: &E) -> Result<u64> {
        let conn = self.connection_for::<E>()?;
        let (sql, args) = Delete::from_entity(record)?.build(conn.dialect)?;
        tracing::debug!(table = E::TABLE, sql = %sql, "executing DELETE");
        conn.executor.execute(&sql, &args)
    }

    /// Load the single related record of a has-one relation.
    pub fn has_one<O: Entity, R: Entity>(&self, owner: &O) -> Result<Option<R>> {
        let descriptor = self.descriptor_towards::<O, R>()?;
        if descriptor.kind() != rowmap_core::RelationKind::HasOne {
            return Err(kind_mismatch::<R>(&descriptor, "has-one"));
        }
        let key = owner_primary_key::<O>(owner)?;
        let conn = self.connection_for::<R>()?;
        let (sql, args) = relation_select(&descriptor, key).build(conn.dialect)?;
        let rows = conn.executor.query(&sql, &args)?;
        bind_first(&rows)
    }

    /// Load the related records of a has-many relation.
    pub fn has_many<O: Entity, R: Entity>(&self, owner: &O) -> Result<Vec<R>> {
        let descriptor = self.descriptor_towards::<O, R>()?;
        if descriptor.kind() != rowmap_core::RelationKind::HasMany {
            return Err(kind_mismatch::<R>(&descriptor, "has-many"));
        }
        let key = owner_primary_key::<O>(owner)?;
        let conn = self.connection_for::<R>()?;
        let (sql, args) = relation_select(&descriptor, key).build(conn.dialect)?;
        let rows = conn.executor.query(&sql, &args)?;
        bind_all(&rows)
    }

    /// Load the owning record of a belongs-to relation.
    pub fn belongs_to<O: Entity, R: Entity>(&self, owner: &O) -> Result<Option<R>> {
        let descriptor = self.descriptor_towards::<O, R>()?;
        let RelationDescriptor::BelongsTo { local_key, .. } = &descriptor else {
            return Err(kind_mismatch::<R>(&descriptor, "belongs-to"));
        };

        let key = owner
            .column_values()
            .into_iter()
            .find(|(column, _)| *column == local_key.as_str())
            .map(|(_, value)| value)
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                Error::relation(
                    RelationErrorKind::MissingKeyValue,
                    format!(
                        "record for table '{}' has no value in '{}'",
                        O::TABLE,
                        local_key
                    ),
                )
            })?;

        let conn = self.connection_for::<R>()?;
        let (sql, args) = relation_select(&descriptor, key).build(conn.dialect)?;
        let rows = conn.executor.query(&sql, &args)?;
        bind_first(&rows)
    }

    /// Load the related records of a belongs-to-many relation.
    ///
    /// Issues the two-step form: one junction lookup, then one IN query
    /// over the collected related keys.
    pub fn belongs_to_many<O: Entity, R: Entity>(&self, owner: &O) -> Result<Vec<R>> {
        let descriptor = self.descriptor_towards::<O, R>()?;
        if descriptor.kind() != rowmap_core::RelationKind::BelongsToMany {
            return Err(kind_mismatch::<R>(&descriptor, "belongs-to-many"));
        }
        let key = owner_primary_key::<O>(owner)?;
        let conn = self.connection_for::<R>()?;

        let (sql, args) = junction_select(&descriptor, key)?.build(conn.dialect)?;
        let junction_rows = conn.executor.query(&sql, &args)?;
        let keys: Vec<Value> = junction_rows
            .iter()
            .filter_map(|row| row.get(0).cloned())
            .collect();
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let (sql, args) = related_by_keys_select(&descriptor, keys)?.build(conn.dialect)?;
        let rows = conn.executor.query(&sql, &args)?;
        bind_all(&rows)
    }

    fn descriptor_towards<O: Entity, R: Entity>(&self) -> Result<RelationDescriptor> {
        let schema = schema_of::<O>();
        schema.relation(R::TABLE).cloned().ok_or_else(|| {
            Error::schema(
                SchemaErrorKind::UnknownRelation,
                format!(
                    "entity for table '{}' declares no relation towards '{}'",
                    O::TABLE,
                    R::TABLE
                ),
            )
        })
    }

    fn fetch<E: Entity>(&self, conn: &Connection, select: &Select) -> Result<Vec<E>> {
        let (sql, args) = select.build(conn.dialect)?;
        tracing::debug!(table = E::TABLE, sql = %sql, "executing SELECT");
        let rows = conn.executor.query(&sql, &args)?;
        bind_all(&rows)
    }
}

/// The owner's primary key value, with the distinct errors for an entity
/// without a key and a record without a key value.
fn owner_primary_key<O: Entity>(owner: &O) -> Result<Value> {
    let schema = schema_of::<O>();
    if schema.primary_key().is_none() {
        return Err(Error::schema(
            SchemaErrorKind::MissingPrimaryKey,
            format!("entity for table '{}' declares no primary key", O::TABLE),
        ));
    }
    let key = owner.primary_key_value();
    if key.is_null() {
        return Err(Error::relation(
            RelationErrorKind::MissingKeyValue,
            format!("record for table '{}' has no primary key value", O::TABLE),
        ));
    }
    Ok(key)
}

fn kind_mismatch<R: Entity>(descriptor: &RelationDescriptor, requested: &str) -> Error {
    Error::relation(
        RelationErrorKind::KindMismatch,
        format!(
            "relation towards '{}' is {}, not {}",
            R::TABLE,
            descriptor.kind().as_str(),
            requested
        ),
    )
}
