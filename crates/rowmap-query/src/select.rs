//! SELECT statement builder.

use crate::clause::OrderBy;
use crate::cond::Cond;
use crate::dialect::Dialect;
use crate::join::Join;
use rowmap_core::{BuildErrorKind, EntitySchema, Error, Result, Value};

/// Aggregate functions usable in the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    /// Render the aggregate over a column.
    pub fn over(self, column: &str) -> String {
        let name = match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        };
        format!("{}({})", name, column)
    }
}

/// A SELECT statement under construction.
///
/// Every method takes and returns the builder by value; nothing aliases a
/// parent statement. `build` emits the clauses in a fixed order:
///
/// ```text
/// SELECT <cols> FROM <table|sub-select> [JOIN ...] [WHERE ...]
/// [GROUP BY ...] [ORDER BY ...] [LIMIT n] [OFFSET n] [HAVING ...]
/// ```
///
/// The FROM source is either a table name or an embedded sub-select —
/// exactly one. Supplying neither or both is a build error.
#[derive(Debug, Clone, Default)]
pub struct Select {
    table: Option<String>,
    sub: Option<Box<Select>>,
    columns: Vec<String>,
    joins: Vec<Join>,
    where_clause: Option<Cond>,
    group_by: Vec<String>,
    having: Option<Cond>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    distinct: bool,
}

impl Select {
    /// Create an empty SELECT.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a SELECT over an entity's table.
    ///
    /// When the dialect qualifies SELECT columns, the projection lists every
    /// stored column as `<table>.<column>`; otherwise it stays at the
    /// default `*`.
    pub fn from_schema(schema: &EntitySchema, dialect: Dialect) -> Self {
        let mut select = Select::new().table(schema.table);
        if dialect.qualify_select_columns() {
            for column in schema.columns() {
                select = select.column(format!("{}.{}", schema.table, column));
            }
        }
        select
    }

    /// Set the FROM table.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Use another SELECT as the FROM source.
    pub fn from_select(mut self, sub: Select) -> Self {
        self.sub = Some(Box::new(sub));
        self
    }

    /// Set the projection, replacing any previous columns.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|&c| c.to_string()).collect();
        self
    }

    /// Append one projection column.
    pub fn column(mut self, col: impl Into<String>) -> Self {
        self.columns.push(col.into());
        self
    }

    /// Append an aggregate to the projection.
    pub fn aggregate(mut self, agg: Aggregate, column: &str) -> Self {
        self.columns.push(agg.over(column));
        self
    }

    /// Add a WHERE condition, AND-combined with any existing one.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(cond),
            None => cond,
        });
        self
    }

    /// Add a WHERE condition, OR-combined with any existing one.
    pub fn or_filter(mut self, cond: Cond) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.or(cond),
            None => cond,
        });
        self
    }

    /// Append a JOIN clause.
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Append an INNER JOIN.
    pub fn inner_join(
        self,
        table: impl Into<String>,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        self.join(Join::inner(table, lhs, rhs))
    }

    /// Append a LEFT JOIN.
    pub fn left_join(
        self,
        table: impl Into<String>,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        self.join(Join::left(table, lhs, rhs))
    }

    /// Append a RIGHT JOIN.
    pub fn right_join(
        self,
        table: impl Into<String>,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        self.join(Join::right(table, lhs, rhs))
    }

    /// Append a FULL OUTER JOIN.
    pub fn full_outer_join(
        self,
        table: impl Into<String>,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        self.join(Join::full_outer(table, lhs, rhs))
    }

    /// Append GROUP BY columns.
    pub fn group_by(mut self, cols: &[&str]) -> Self {
        self.group_by.extend(cols.iter().map(|&c| c.to_string()));
        self
    }

    /// Add a HAVING condition, AND-combined with any existing one.
    pub fn having(mut self, cond: Cond) -> Self {
        self.having = Some(match self.having {
            Some(existing) => existing.and(cond),
            None => cond,
        });
        self
    }

    /// Append an ORDER BY term.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Make this a DISTINCT query.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Build the SQL string and its positional arguments.
    pub fn build(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        let mut params = Vec::new();
        let sql = self.render(dialect, &mut params)?;
        tracing::trace!(sql = %sql, args = params.len(), "built SELECT");
        Ok((sql, params))
    }

    /// Render into an existing argument list (used for embedded
    /// sub-selects, so placeholder numbering continues across levels).
    fn render(&self, dialect: Dialect, params: &mut Vec<Value>) -> Result<String> {
        let from = match (&self.table, &self.sub) {
            (Some(_), Some(_)) => {
                return Err(Error::build(
                    BuildErrorKind::AmbiguousFrom,
                    "both a table and a sub-query were supplied",
                ));
            }
            (None, None) => {
                return Err(Error::build(
                    BuildErrorKind::MissingTable,
                    "SELECT needs a table or a sub-query",
                ));
            }
            (Some(table), None) => table.clone(),
            (None, Some(sub)) => format!("({})", sub.render(dialect, params)?),
        };

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&from);

        for join in &self.joins {
            sql.push_str(&join.to_sql());
        }

        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.render(dialect, params));
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let terms: Vec<String> = self.order_by.iter().map(OrderBy::to_sql).collect();
            sql.push_str(&terms.join(", "));
        }

        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        if let Some(n) = self.offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }

        if let Some(having) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(&having.render(dialect, params));
        }

        Ok(sql)
    }
}
