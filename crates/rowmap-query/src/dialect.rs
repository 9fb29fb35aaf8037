//! Static dialect descriptors.
//!
//! One immutable descriptor per supported backend. A dialect is chosen once,
//! when a connection is registered, and threaded through every builder call;
//! the builders never branch on backend names themselves.

use serde::{Deserialize, Serialize};

/// SQL dialect descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// MySQL: bare `?` placeholders, table-qualified SELECT columns.
    Mysql,
    /// PostgreSQL: `$1, $2, ...` placeholders.
    #[default]
    Postgres,
    /// SQLite: `?1, ?2, ...` placeholders.
    Sqlite,
}

impl Dialect {
    /// The driver name this descriptor belongs to.
    pub const fn driver_name(self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite3",
        }
    }

    /// The placeholder character.
    pub const fn placeholder_char(self) -> char {
        match self {
            Dialect::Mysql | Dialect::Sqlite => '?',
            Dialect::Postgres => '$',
        }
    }

    /// Whether placeholders carry a 1-based positional index.
    pub const fn numbered_placeholders(self) -> bool {
        match self {
            Dialect::Mysql => false,
            Dialect::Postgres | Dialect::Sqlite => true,
        }
    }

    /// Whether SELECT columns must be table-qualified for this backend.
    pub const fn qualify_select_columns(self) -> bool {
        matches!(self, Dialect::Mysql)
    }

    /// Generate the placeholder for a 1-based argument index.
    pub fn placeholder(self, index: usize) -> String {
        if self.numbered_placeholders() {
            format!("{}{}", self.placeholder_char(), index)
        } else {
            self.placeholder_char().to_string()
        }
    }

    /// Generate `count` consecutive placeholders starting at a 1-based index.
    pub fn placeholders(self, start: usize, count: usize) -> Vec<String> {
        (start..start + count).map(|i| self.placeholder(i)).collect()
    }
}
