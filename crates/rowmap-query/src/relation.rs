//! SELECT shapes for resolved relations.
//!
//! Given a resolved [`RelationDescriptor`] and the owning record's key
//! value, these helpers emit the statement that loads the related rows.
//! BelongsToMany has two forms: a single joined SELECT, and the two-step
//! junction lookup (`junction_select` + `related_by_keys_select`) for
//! callers that prefer the second query.

use crate::cond::Cond;
use crate::select::Select;
use rowmap_core::{Error, RelationDescriptor, RelationErrorKind, Result, Value};

/// Build the SELECT that loads a relation for one owning record.
///
/// `key` is the owner-side key value: the owner's primary key for
/// HasOne/HasMany/BelongsToMany, and the owner's local foreign-key value
/// for BelongsTo.
pub fn relation_select(descriptor: &RelationDescriptor, key: Value) -> Select {
    match descriptor {
        RelationDescriptor::HasOne {
            related_table,
            foreign_key,
        }
        | RelationDescriptor::HasMany {
            related_table,
            foreign_key,
        } => Select::new()
            .table(*related_table)
            .filter(Cond::eq(foreign_key.clone(), key)),

        RelationDescriptor::BelongsTo {
            related_table,
            related_key,
            ..
        } => Select::new()
            .table(*related_table)
            .filter(Cond::eq(related_key.clone(), key)),

        RelationDescriptor::BelongsToMany {
            related_table,
            junction_table,
            junction_owner_key,
            junction_related_key,
            related_key,
        } => Select::new()
            .table(*related_table)
            .column(format!("{}.*", related_table))
            .inner_join(
                *junction_table,
                format!("{}.{}", related_table, related_key),
                format!("{}.{}", junction_table, junction_related_key),
            )
            .filter(Cond::eq(
                format!("{}.{}", junction_table, junction_owner_key),
                key,
            )),
    }
}

/// Build the junction lookup of the two-step BelongsToMany load: the
/// related-side keys for one owner.
pub fn junction_select(descriptor: &RelationDescriptor, key: Value) -> Result<Select> {
    match descriptor {
        RelationDescriptor::BelongsToMany {
            junction_table,
            junction_owner_key,
            junction_related_key,
            ..
        } => Ok(Select::new()
            .table(*junction_table)
            .column(junction_related_key.clone())
            .filter(Cond::eq(junction_owner_key.clone(), key))),
        other => Err(Error::relation(
            RelationErrorKind::KindMismatch,
            format!(
                "junction lookup applies to belongs-to-many, not {}",
                other.kind().as_str()
            ),
        )),
    }
}

/// Build the second step of the two-step BelongsToMany load: the related
/// rows whose key is among the junction results.
pub fn related_by_keys_select(descriptor: &RelationDescriptor, keys: Vec<Value>) -> Result<Select> {
    match descriptor {
        RelationDescriptor::BelongsToMany {
            related_table,
            related_key,
            ..
        } => Ok(Select::new()
            .table(*related_table)
            .filter(Cond::is_in(related_key.clone(), keys))),
        other => Err(Error::relation(
            RelationErrorKind::KindMismatch,
            format!(
                "key-list lookup applies to belongs-to-many, not {}",
                other.kind().as_str()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_has_many_select() {
        let descriptor = RelationDescriptor::HasMany {
            related_table: "comments",
            foreign_key: "post_id".to_string(),
        };
        let (sql, params) = relation_select(&descriptor, Value::BigInt(7))
            .build(Dialect::Postgres)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM comments WHERE post_id = $1");
        assert_eq!(params, vec![Value::BigInt(7)]);
    }

    #[test]
    fn test_belongs_to_select() {
        let descriptor = RelationDescriptor::BelongsTo {
            related_table: "posts",
            local_key: "post_id".to_string(),
            related_key: "id".to_string(),
        };
        let (sql, params) = relation_select(&descriptor, Value::BigInt(3))
            .build(Dialect::Postgres)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM posts WHERE id = $1");
        assert_eq!(params, vec![Value::BigInt(3)]);
    }

    fn categories_descriptor() -> RelationDescriptor {
        RelationDescriptor::BelongsToMany {
            related_table: "categories",
            junction_table: "post_categories",
            junction_owner_key: "post_id".to_string(),
            junction_related_key: "category_id".to_string(),
            related_key: "id".to_string(),
        }
    }

    #[test]
    fn test_belongs_to_many_joined_select() {
        let (sql, params) = relation_select(&categories_descriptor(), Value::BigInt(9))
            .build(Dialect::Postgres)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT categories.* FROM categories \
             INNER JOIN post_categories ON categories.id = post_categories.category_id \
             WHERE post_categories.post_id = $1"
        );
        assert_eq!(params, vec![Value::BigInt(9)]);
    }

    #[test]
    fn test_belongs_to_many_two_step() {
        let first = junction_select(&categories_descriptor(), Value::BigInt(9)).unwrap();
        let (sql, _) = first.build(Dialect::Postgres).unwrap();
        assert_eq!(
            sql,
            "SELECT category_id FROM post_categories WHERE post_id = $1"
        );

        let second = related_by_keys_select(
            &categories_descriptor(),
            vec![Value::BigInt(1), Value::BigInt(2)],
        )
        .unwrap();
        let (sql, params) = second.build(Dialect::Postgres).unwrap();
        assert_eq!(sql, "SELECT * FROM categories WHERE id IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_junction_select_rejects_other_kinds() {
        let descriptor = RelationDescriptor::HasOne {
            related_table: "profiles",
            foreign_key: "user_id".to_string(),
        };
        let err = junction_select(&descriptor, Value::BigInt(1)).unwrap_err();
        match err {
            Error::Relation(re) => assert_eq!(re.kind, RelationErrorKind::KindMismatch),
            other => panic!("expected relation error, got {other}"),
        }
    }
}
