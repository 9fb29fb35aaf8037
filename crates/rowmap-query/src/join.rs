//! JOIN clauses.

/// The supported join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    FullOuter,
}

impl JoinKind {
    /// The SQL keyword for this join kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::FullOuter => "FULL OUTER JOIN",
        }
    }
}

/// One JOIN clause: `<kind> <table> ON <lhs> = <rhs>`.
///
/// Joins render in the order they were declared on the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub lhs: String,
    pub rhs: String,
}

impl Join {
    /// Create a join of the given kind.
    pub fn new(
        kind: JoinKind,
        table: impl Into<String>,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// INNER JOIN.
    pub fn inner(table: impl Into<String>, lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, table, lhs, rhs)
    }

    /// LEFT JOIN.
    pub fn left(table: impl Into<String>, lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, table, lhs, rhs)
    }

    /// RIGHT JOIN.
    pub fn right(table: impl Into<String>, lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::new(JoinKind::Right, table, lhs, rhs)
    }

    /// FULL OUTER JOIN.
    pub fn full_outer(
        table: impl Into<String>,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        Self::new(JoinKind::FullOuter, table, lhs, rhs)
    }

    /// Render this clause, leading space included.
    pub fn to_sql(&self) -> String {
        format!(
            " {} {} ON {} = {}",
            self.kind.as_str(),
            self.table,
            self.lhs,
            self.rhs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keywords() {
        assert_eq!(JoinKind::Inner.as_str(), "INNER JOIN");
        assert_eq!(JoinKind::FullOuter.as_str(), "FULL OUTER JOIN");
    }

    #[test]
    fn test_join_rendering() {
        let join = Join::right("addresses", "users.id", "addresses.user_id");
        assert_eq!(
            join.to_sql(),
            " RIGHT JOIN addresses ON users.id = addresses.user_id"
        );
    }
}
