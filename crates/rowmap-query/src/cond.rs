//! Boolean condition trees for WHERE and HAVING.
//!
//! Conditions form a binary tree combined with AND/OR/NOT. Rendering walks
//! the tree left to right, pushing each bound value onto the statement's
//! argument list as its placeholder is emitted, so placeholder numbering is
//! continuous however clauses are composed. Mixed AND/OR nesting is
//! parenthesized so the tree renders exactly as it was written — no
//! operator is ever dropped or re-associated.

use crate::dialect::Dialect;
use rowmap_core::Value;

/// Comparison operators for `lhs op rhs` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal (=)
    Eq,
    /// Not equal (<>)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
}

impl CmpOp {
    /// The SQL spelling of this operator.
    pub const fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A bound value, emitted as a placeholder.
    Value(Value),
    /// Another column reference, emitted verbatim.
    Column(String),
    /// A raw SQL fragment, emitted verbatim (escape hatch).
    Raw(String),
}

impl Operand {
    /// A bound-value operand.
    pub fn value(value: impl Into<Value>) -> Self {
        Operand::Value(value.into())
    }

    /// A column-reference operand.
    pub fn column(name: impl Into<String>) -> Self {
        Operand::Column(name.into())
    }

    /// A raw SQL operand.
    pub fn raw(sql: impl Into<String>) -> Self {
        Operand::Raw(sql.into())
    }
}

/// A node of the condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// `column op operand`
    Compare {
        column: String,
        op: CmpOp,
        operand: Operand,
    },

    /// `column [NOT] IN (...)` — one placeholder per value.
    In {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// `column [NOT] BETWEEN low AND high`
    Between {
        column: String,
        low: Value,
        high: Value,
        negated: bool,
    },

    /// `column [NOT] LIKE pattern` — the pattern is bound, never inlined.
    Like {
        column: String,
        pattern: String,
        negated: bool,
    },

    /// `column IS [NOT] NULL`
    IsNull { column: String, negated: bool },

    /// Both sides must hold.
    And(Box<Cond>, Box<Cond>),

    /// Either side must hold.
    Or(Box<Cond>, Box<Cond>),

    /// Negation of the inner tree.
    Not(Box<Cond>),

    /// Raw SQL fragment (escape hatch).
    Raw(String),
}

impl Cond {
    /// `column op operand` — the general form, for column-to-column and
    /// raw right-hand sides.
    pub fn cmp(column: impl Into<String>, op: CmpOp, operand: Operand) -> Self {
        Cond::Compare {
            column: column.into(),
            op,
            operand,
        }
    }

    /// `column = value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Cond::cmp(column, CmpOp::Eq, Operand::value(value))
    }

    /// `column <> value`.
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Cond::cmp(column, CmpOp::Ne, Operand::value(value))
    }

    /// `column < value`.
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Cond::cmp(column, CmpOp::Lt, Operand::value(value))
    }

    /// `column <= value`.
    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Cond::cmp(column, CmpOp::Le, Operand::value(value))
    }

    /// `column > value`.
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Cond::cmp(column, CmpOp::Gt, Operand::value(value))
    }

    /// `column >= value`.
    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Cond::cmp(column, CmpOp::Ge, Operand::value(value))
    }

    /// `column IN (...)`.
    pub fn is_in(column: impl Into<String>, values: Vec<impl Into<Value>>) -> Self {
        Cond::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    /// `column NOT IN (...)`.
    pub fn not_in(column: impl Into<String>, values: Vec<impl Into<Value>>) -> Self {
        Cond::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    /// `column BETWEEN low AND high`.
    pub fn between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Cond::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: false,
        }
    }

    /// `column LIKE pattern`.
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Cond::Like {
            column: column.into(),
            pattern: pattern.into(),
            negated: false,
        }
    }

    /// `column NOT LIKE pattern`.
    pub fn not_like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Cond::Like {
            column: column.into(),
            pattern: pattern.into(),
            negated: true,
        }
    }

    /// `column IS NULL`.
    pub fn is_null(column: impl Into<String>) -> Self {
        Cond::IsNull {
            column: column.into(),
            negated: false,
        }
    }

    /// `column IS NOT NULL`.
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Cond::IsNull {
            column: column.into(),
            negated: true,
        }
    }

    /// Raw SQL condition (escape hatch).
    pub fn raw(sql: impl Into<String>) -> Self {
        Cond::Raw(sql.into())
    }

    /// Combine with AND, keeping left-to-right order.
    pub fn and(self, other: Cond) -> Self {
        Cond::And(Box::new(self), Box::new(other))
    }

    /// Combine with OR, keeping left-to-right order.
    pub fn or(self, other: Cond) -> Self {
        Cond::Or(Box::new(self), Box::new(other))
    }

    /// Negate this tree.
    pub fn negate(self) -> Self {
        Cond::Not(Box::new(self))
    }

    /// Render this tree, pushing bound values onto `params`.
    ///
    /// Placeholder indices continue from whatever `params` already holds,
    /// which is what keeps numbering correct when a condition is rendered
    /// after a sub-query or an earlier clause.
    pub fn render(&self, dialect: Dialect, params: &mut Vec<Value>) -> String {
        match self {
            Cond::Compare {
                column,
                op,
                operand,
            } => {
                let rhs = match operand {
                    Operand::Value(v) => {
                        params.push(v.clone());
                        dialect.placeholder(params.len())
                    }
                    Operand::Column(c) => c.clone(),
                    Operand::Raw(sql) => sql.clone(),
                };
                format!("{} {} {}", column, op.as_str(), rhs)
            }

            Cond::In {
                column,
                values,
                negated,
            } => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| {
                        params.push(v.clone());
                        dialect.placeholder(params.len())
                    })
                    .collect();
                let not = if *negated { "NOT " } else { "" };
                format!("{} {}IN ({})", column, not, placeholders.join(", "))
            }

            Cond::Between {
                column,
                low,
                high,
                negated,
            } => {
                params.push(low.clone());
                let low_ph = dialect.placeholder(params.len());
                params.push(high.clone());
                let high_ph = dialect.placeholder(params.len());
                let not = if *negated { "NOT " } else { "" };
                format!("{} {}BETWEEN {} AND {}", column, not, low_ph, high_ph)
            }

            Cond::Like {
                column,
                pattern,
                negated,
            } => {
                params.push(Value::Text(pattern.clone()));
                let ph = dialect.placeholder(params.len());
                let not = if *negated { "NOT " } else { "" };
                format!("{} {}LIKE {}", column, not, ph)
            }

            Cond::IsNull { column, negated } => {
                let not = if *negated { "NOT " } else { "" };
                format!("{} IS {}NULL", column, not)
            }

            Cond::And(left, right) => format!(
                "{} AND {}",
                left.render_grouped(dialect, params, LogicalOp::And),
                right.render_grouped(dialect, params, LogicalOp::And)
            ),

            Cond::Or(left, right) => format!(
                "{} OR {}",
                left.render_grouped(dialect, params, LogicalOp::Or),
                right.render_grouped(dialect, params, LogicalOp::Or)
            ),

            Cond::Not(inner) => match inner.as_ref() {
                Cond::And(..) | Cond::Or(..) => {
                    format!("NOT ({})", inner.render(dialect, params))
                }
                _ => format!("NOT {}", inner.render(dialect, params)),
            },

            Cond::Raw(sql) => sql.clone(),
        }
    }

    /// Render a child of a logical node, parenthesizing when the child is a
    /// logical node of the other kind. Same-kind chains stay flat (they are
    /// left-associated by construction); mixed chains keep their written
    /// grouping instead of falling back to SQL precedence.
    fn render_grouped(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        parent: LogicalOp,
    ) -> String {
        let needs_parens = matches!(
            (self, parent),
            (Cond::Or(..), LogicalOp::And) | (Cond::And(..), LogicalOp::Or)
        );
        let sql = self.render(dialect, params);
        if needs_parens {
            format!("({})", sql)
        } else {
            sql
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LogicalOp {
    And,
    Or,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(cond: &Cond, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let sql = cond.render(dialect, &mut params);
        (sql, params)
    }

    #[test]
    fn test_compare_with_bound_value() {
        let (sql, params) = render(&Cond::eq("id", 1_i64), Dialect::Postgres);
        assert_eq!(sql, "id = $1");
        assert_eq!(params, vec![Value::BigInt(1)]);
    }

    #[test]
    fn test_compare_with_column_operand() {
        let (sql, params) = render(
            &Cond::cmp("users.id", CmpOp::Eq, Operand::column("addresses.user_id")),
            Dialect::Postgres,
        );
        assert_eq!(sql, "users.id = addresses.user_id");
        assert!(params.is_empty());
    }

    #[test]
    fn test_in_expands_one_placeholder_per_value() {
        let (sql, params) = render(&Cond::is_in("id", vec![1, 2, 3]), Dialect::Postgres);
        assert_eq!(sql, "id IN ($1, $2, $3)");
        assert_eq!(params.len(), 3);

        let (sql, _) = render(&Cond::is_in("id", vec![1, 2, 3]), Dialect::Mysql);
        assert_eq!(sql, "id IN (?, ?, ?)");
    }

    #[test]
    fn test_not_in() {
        let (sql, _) = render(&Cond::not_in("status", vec!["a", "b"]), Dialect::Sqlite);
        assert_eq!(sql, "status NOT IN (?1, ?2)");
    }

    #[test]
    fn test_between_and_like_bind_their_arguments() {
        let (sql, params) = render(&Cond::between("age", 18, 30), Dialect::Postgres);
        assert_eq!(sql, "age BETWEEN $1 AND $2");
        assert_eq!(params, vec![Value::Int(18), Value::Int(30)]);

        let (sql, params) = render(&Cond::like("name", "%mir%"), Dialect::Postgres);
        assert_eq!(sql, "name LIKE $1");
        assert_eq!(params, vec![Value::Text("%mir%".to_string())]);
    }

    #[test]
    fn test_is_null() {
        let (sql, _) = render(&Cond::is_null("deleted_at"), Dialect::Postgres);
        assert_eq!(sql, "deleted_at IS NULL");
        let (sql, _) = render(&Cond::is_not_null("deleted_at"), Dialect::Postgres);
        assert_eq!(sql, "deleted_at IS NOT NULL");
    }

    #[test]
    fn test_and_chain_stays_flat_and_ordered() {
        let cond = Cond::eq("a", 1).and(Cond::eq("b", 2)).and(Cond::eq("c", 3));
        let (sql, params) = render(&cond, Dialect::Postgres);
        assert_eq!(sql, "a = $1 AND b = $2 AND c = $3");
        assert_eq!(
            params,
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn test_mixed_or_then_and_preserves_written_order() {
        // (a OR b) AND c — without the parens SQL precedence would read it
        // as a OR (b AND c).
        let cond = Cond::eq("a", 1).or(Cond::eq("b", 2)).and(Cond::eq("c", 3));
        let (sql, _) = render(&cond, Dialect::Postgres);
        assert_eq!(sql, "(a = $1 OR b = $2) AND c = $3");
    }

    #[test]
    fn test_mixed_and_then_or_stays_unparenthesized_only_where_safe() {
        let cond = Cond::eq("a", 1).and(Cond::eq("b", 2)).or(Cond::eq("c", 3));
        let (sql, _) = render(&cond, Dialect::Postgres);
        assert_eq!(sql, "(a = $1 AND b = $2) OR c = $3");
    }

    #[test]
    fn test_not_parenthesizes_logical_children() {
        let (sql, _) = render(&Cond::eq("a", 1).negate(), Dialect::Postgres);
        assert_eq!(sql, "NOT a = $1");

        let (sql, _) = render(
            &Cond::eq("a", 1).and(Cond::eq("b", 2)).negate(),
            Dialect::Postgres,
        );
        assert_eq!(sql, "NOT (a = $1 AND b = $2)");
    }

    #[test]
    fn test_rendering_continues_existing_numbering() {
        let mut params = vec![Value::Int(99)];
        let sql = Cond::eq("id", 1).render(Dialect::Postgres, &mut params);
        assert_eq!(sql, "id = $2");
        assert_eq!(params.len(), 2);
    }
}
