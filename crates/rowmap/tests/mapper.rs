//! End-to-end mapper tests against a scripted executor: statement text,
//! argument order, bound records, and the distinct error paths.

mod common;

use common::{Address, AuditEvent, Category, Comment, FakeExecutor, Post, User};
use rowmap::{
    Cond, Dialect, Error, Mapper, RelationErrorKind, SchemaErrorKind, Value,
};
use std::sync::Arc;

fn postgres_mapper() -> (Mapper, Arc<FakeExecutor>) {
    let executor = FakeExecutor::shared();
    let mut mapper = Mapper::new();
    mapper.register("default", Dialect::Postgres, Arc::clone(&executor));
    (mapper, executor)
}

#[test]
fn find_where_builds_the_expected_statement_and_binds_rows() {
    let (mapper, executor) = postgres_mapper();
    executor.push_rows(
        &["id", "name", "age"],
        vec![
            vec![
                Value::Int(1),
                Value::Text("amirreza".to_string()),
                Value::Int(30),
            ],
            vec![
                Value::Int(2),
                Value::Text("milad".to_string()),
                Value::Int(28),
            ],
        ],
    );

    let users: Vec<User> = mapper.find_where(Cond::gt("age", 18)).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "amirreza");
    assert_eq!(users[1].name, "milad");

    let calls = executor.calls();
    assert_eq!(calls[0].0, "SELECT * FROM users WHERE age > $1");
    assert_eq!(calls[0].1, vec![Value::Int(18)]);
}

#[test]
fn get_fetches_by_primary_key_with_limit() {
    let (mapper, executor) = postgres_mapper();
    executor.push_rows(
        &["id", "name", "age"],
        vec![vec![
            Value::Int(1),
            Value::Text("amirreza".to_string()),
            Value::Int(30),
        ]],
    );

    let user: Option<User> = mapper.get(1_i64).unwrap();
    assert_eq!(user.unwrap().name, "amirreza");

    let calls = executor.calls();
    assert_eq!(calls[0].0, "SELECT * FROM users WHERE id = $1 LIMIT 1");
    assert_eq!(calls[0].1, vec![Value::BigInt(1)]);
}

#[test]
fn get_on_a_keyless_entity_is_a_distinct_error() {
    let (mapper, _) = postgres_mapper();
    let err = mapper.get::<AuditEvent>(1_i64).unwrap_err();
    match err {
        Error::Schema(se) => assert_eq!(se.kind, SchemaErrorKind::MissingPrimaryKey),
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn mysql_connection_qualifies_select_columns() {
    let executor = FakeExecutor::shared();
    let mut mapper = Mapper::new();
    mapper.register("default", Dialect::Mysql, Arc::clone(&executor));

    let _: Vec<User> = mapper.find_where(Cond::eq("id", 1_i64)).unwrap();

    let calls = executor.calls();
    assert_eq!(
        calls[0].0,
        "SELECT users.id, users.name, users.age FROM users WHERE id = ?"
    );
}

#[test]
fn insert_skips_unset_auto_increment_key() {
    let (mapper, executor) = postgres_mapper();
    executor.push_execute(42);

    let user = User {
        id: None,
        name: "amirreza".to_string(),
        age: 30,
        address: None,
    };
    let id = mapper.insert(&user).unwrap();
    assert_eq!(id, 42);

    let calls = executor.calls();
    assert_eq!(calls[0].0, "INSERT INTO users (name, age) VALUES ($1, $2)");
    assert_eq!(
        calls[0].1,
        vec![Value::Text("amirreza".to_string()), Value::Int(30)]
    );
}

#[test]
fn update_sets_stored_fields_keyed_by_primary_key() {
    let (mapper, executor) = postgres_mapper();

    let user = User {
        id: Some(2),
        name: "milad".to_string(),
        age: 28,
        address: None,
    };
    mapper.update(&user).unwrap();

    let calls = executor.calls();
    assert_eq!(
        calls[0].0,
        "UPDATE users SET name = $1, age = $2 WHERE id = $3"
    );
    assert_eq!(
        calls[0].1,
        vec![
            Value::Text("milad".to_string()),
            Value::Int(28),
            Value::BigInt(2),
        ]
    );
}

#[test]
fn update_without_key_value_fails_before_touching_the_executor() {
    let (mapper, executor) = postgres_mapper();
    let err = mapper.update(&User::default()).unwrap_err();
    match err {
        Error::Schema(se) => assert_eq!(se.kind, SchemaErrorKind::MissingPrimaryKey),
        other => panic!("expected schema error, got {other}"),
    }
    assert!(executor.calls().is_empty());
}

#[test]
fn delete_filters_by_primary_key() {
    let (mapper, executor) = postgres_mapper();

    let user = User {
        id: Some(4),
        name: "amirreza".to_string(),
        age: 30,
        address: None,
    };
    mapper.delete(&user).unwrap();

    let calls = executor.calls();
    assert_eq!(calls[0].0, "DELETE FROM users WHERE id = $1");
    assert_eq!(calls[0].1, vec![Value::BigInt(4)]);
}

#[test]
fn has_many_loads_related_rows_by_derived_foreign_key() {
    let (mapper, executor) = postgres_mapper();
    executor.push_rows(
        &["id", "body", "post_id"],
        vec![
            vec![Value::Int(10), Value::Text("first".to_string()), Value::Int(1)],
            vec![Value::Int(11), Value::Text("second".to_string()), Value::Int(1)],
        ],
    );

    let post = Post {
        id: 1,
        title: "hello".to_string(),
        comments: Vec::new(),
        categories: Vec::new(),
    };
    let comments: Vec<Comment> = mapper.has_many(&post).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].body, "first");

    let calls = executor.calls();
    assert_eq!(calls[0].0, "SELECT * FROM comments WHERE post_id = $1");
    assert_eq!(calls[0].1, vec![Value::BigInt(1)]);
}

#[test]
fn has_one_loads_a_single_related_row() {
    let (mapper, executor) = postgres_mapper();
    executor.push_rows(
        &["id", "path", "user_id"],
        vec![vec![
            Value::Int(7),
            Value::Text("/home/a".to_string()),
            Value::Int(1),
        ]],
    );

    let user = User {
        id: Some(1),
        name: "amirreza".to_string(),
        age: 30,
        address: None,
    };
    let address: Option<Address> = mapper.has_one(&user).unwrap();
    assert_eq!(address.unwrap().path, "/home/a");

    let calls = executor.calls();
    assert_eq!(calls[0].0, "SELECT * FROM addresses WHERE user_id = $1");
}

#[test]
fn belongs_to_loads_the_owner_by_local_key_value() {
    let (mapper, executor) = postgres_mapper();
    executor.push_rows(
        &["id", "title"],
        vec![vec![Value::Int(5), Value::Text("hello".to_string())]],
    );

    let comment = Comment {
        id: 10,
        body: "first".to_string(),
        post_id: 5,
        post: None,
    };
    let post: Option<Post> = mapper.belongs_to(&comment).unwrap();
    assert_eq!(post.unwrap().title, "hello");

    let calls = executor.calls();
    assert_eq!(calls[0].0, "SELECT * FROM posts WHERE id = $1");
    assert_eq!(calls[0].1, vec![Value::BigInt(5)]);
}

#[test]
fn belongs_to_many_issues_junction_then_in_lookup() {
    let (mapper, executor) = postgres_mapper();
    executor.push_rows(
        &["category_id"],
        vec![vec![Value::Int(3)], vec![Value::Int(4)]],
    );
    executor.push_rows(
        &["id", "title"],
        vec![
            vec![Value::Int(3), Value::Text("rust".to_string())],
            vec![Value::Int(4), Value::Text("sql".to_string())],
        ],
    );

    let post = Post {
        id: 1,
        title: "hello".to_string(),
        comments: Vec::new(),
        categories: Vec::new(),
    };
    let categories: Vec<Category> = mapper.belongs_to_many(&post).unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].title, "sql");

    let calls = executor.calls();
    assert_eq!(
        calls[0].0,
        "SELECT category_id FROM post_categories WHERE post_id = $1"
    );
    assert_eq!(calls[0].1, vec![Value::BigInt(1)]);
    assert_eq!(calls[1].0, "SELECT * FROM categories WHERE id IN ($1, $2)");
    assert_eq!(calls[1].1, vec![Value::Int(3), Value::Int(4)]);
}

#[test]
fn belongs_to_many_with_no_junction_rows_skips_the_second_query() {
    let (mapper, executor) = postgres_mapper();
    executor.push_rows(&["category_id"], vec![]);

    let post = Post {
        id: 1,
        title: "hello".to_string(),
        comments: Vec::new(),
        categories: Vec::new(),
    };
    let categories: Vec<Category> = mapper.belongs_to_many(&post).unwrap();
    assert!(categories.is_empty());
    assert_eq!(executor.calls().len(), 1);
}

#[test]
fn undeclared_relation_is_a_schema_error() {
    let (mapper, _) = postgres_mapper();
    let user = User::default();
    let err = mapper.has_many::<User, Category>(&user).unwrap_err();
    match err {
        Error::Schema(se) => assert_eq!(se.kind, SchemaErrorKind::UnknownRelation),
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn relation_kind_mismatch_is_a_relation_error() {
    let (mapper, _) = postgres_mapper();
    let post = Post {
        id: 1,
        title: "hello".to_string(),
        comments: Vec::new(),
        categories: Vec::new(),
    };
    let err = mapper.has_one::<Post, Comment>(&post).unwrap_err();
    match err {
        Error::Relation(re) => assert_eq!(re.kind, RelationErrorKind::KindMismatch),
        other => panic!("expected relation error, got {other}"),
    }
}

#[test]
fn relation_load_without_owner_key_value_is_a_relation_error() {
    let (mapper, _) = postgres_mapper();
    let user = User::default();
    let err = mapper.has_one::<User, Address>(&user).unwrap_err();
    match err {
        Error::Relation(re) => assert_eq!(re.kind, RelationErrorKind::MissingKeyValue),
        other => panic!("expected relation error, got {other}"),
    }
}

#[test]
fn executor_errors_pass_through_untouched() {
    struct FailingExecutor;

    impl rowmap::Executor for FailingExecutor {
        fn query(&self, _sql: &str, _args: &[Value]) -> rowmap::Result<Vec<rowmap::Row>> {
            Err(Error::executor("connection reset", None))
        }

        fn execute(&self, _sql: &str, _args: &[Value]) -> rowmap::Result<u64> {
            Err(Error::executor("connection reset", None))
        }
    }

    let mut mapper = Mapper::new();
    mapper.register("default", Dialect::Postgres, FailingExecutor);
    let err = mapper.find_all::<User>().unwrap_err();
    match err {
        Error::Executor { message, .. } => assert_eq!(message, "connection reset"),
        other => panic!("expected executor error, got {other}"),
    }
}
