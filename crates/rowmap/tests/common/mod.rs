//! Shared fixtures: test entities and the scripted executor.
#![allow(dead_code)]

use rowmap::{Entity, Executor, Result, Row, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Entity, Default, Debug)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub age: i32,
    #[entity(has_one)]
    pub address: Option<Address>,
}

#[derive(Entity, Default, Debug)]
pub struct Address {
    pub id: i64,
    pub path: String,
    pub user_id: i64,
}

#[derive(Entity, Default, Debug)]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[entity(has_many)]
    pub comments: Vec<Comment>,
    #[entity(belongs_to_many(junction = "post_categories"))]
    pub categories: Vec<Category>,
}

#[derive(Entity, Default, Debug)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub post_id: i64,
    #[entity(belongs_to)]
    pub post: Option<Post>,
}

#[derive(Entity, Default, Debug)]
pub struct Category {
    pub id: i64,
    pub title: String,
}

/// An entity with no primary key: extraction succeeds, key-dependent
/// operations must fail with the distinct error.
#[derive(Entity, Default, Debug)]
pub struct AuditEvent {
    pub label: String,
}

/// A scripted executor: returns canned result sets in order and records
/// every statement it was handed.
#[derive(Default)]
pub struct FakeExecutor {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    query_results: Mutex<VecDeque<Vec<Row>>>,
    execute_results: Mutex<VecDeque<u64>>,
}

impl FakeExecutor {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the rows the next query call returns.
    pub fn push_rows(&self, columns: &[&str], data: Vec<Vec<Value>>) {
        let names: Vec<String> = columns.iter().map(|c| (*c).to_string()).collect();
        let rows = data
            .into_iter()
            .map(|values| Row::new(names.clone(), values))
            .collect();
        self.query_results.lock().unwrap().push_back(rows);
    }

    /// Queue the result of the next execute call.
    pub fn push_execute(&self, result: u64) {
        self.execute_results.lock().unwrap().push_back(result);
    }

    /// Every `(sql, args)` pair seen so far, in call order.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Executor for FakeExecutor {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
        Ok(self
            .query_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
        Ok(self
            .execute_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(1))
    }
}
