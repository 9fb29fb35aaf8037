//! Error types for rowmap operations.

use std::fmt;

/// The primary error type for all rowmap operations.
#[derive(Debug)]
pub enum Error {
    /// Entity schema errors (misconfigured record types)
    Schema(SchemaError),
    /// Statement construction errors
    Build(BuildError),
    /// Row-to-record binding errors
    Bind(BindError),
    /// Relation resolution/loading errors
    Relation(RelationError),
    /// Errors propagated from the execution collaborator
    Executor {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// Custom error with message
    Custom(String),
}

/// Schema errors are programmer errors: they surface at the first use of a
/// misconfigured record type and are never retried.
#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// More than one field marked as primary key
    AmbiguousPrimaryKey,
    /// A primary-key-dependent operation on an entity without one
    MissingPrimaryKey,
    /// BelongsToMany relation without a junction table name
    MissingJunctionTable,
    /// No relation declared towards the requested table
    UnknownRelation,
    /// Entity names a connection that was never registered
    UnknownConnection,
}

/// Statement build errors. A failed build never emits a partial statement.
#[derive(Debug)]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// Neither a table nor a sub-query was supplied
    MissingTable,
    /// Both a table and a sub-query were supplied
    AmbiguousFrom,
    /// INSERT row value count differs from the column count
    ValueCountMismatch,
    /// UPDATE with no SET pairs, INSERT with no columns/rows
    EmptyClause,
}

/// A column-to-field conversion failure. Aborts the bind it occurred in;
/// rows bound before the failure are left as-is.
#[derive(Debug)]
pub struct BindError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

/// Relation errors: a key that convention cannot derive, or a key value
/// missing on the owning record at load time.
#[derive(Debug)]
pub struct RelationError {
    pub kind: RelationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationErrorKind {
    /// The owner record carries no value for the relation key
    MissingKeyValue,
    /// The declared relation is of a different kind than requested
    KindMismatch,
}

impl Error {
    /// Shorthand for a schema error.
    pub fn schema(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Error::Schema(SchemaError {
            kind,
            message: message.into(),
        })
    }

    /// Shorthand for a build error.
    pub fn build(kind: BuildErrorKind, message: impl Into<String>) -> Self {
        Error::Build(BuildError {
            kind,
            message: message.into(),
        })
    }

    /// Shorthand for a relation error.
    pub fn relation(kind: RelationErrorKind, message: impl Into<String>) -> Self {
        Error::Relation(RelationError {
            kind,
            message: message.into(),
        })
    }

    /// Wrap an executor-side failure.
    pub fn executor(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Executor {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "schema error: {}", e),
            Error::Build(e) => write!(f, "build error: {}", e),
            Error::Bind(e) => write!(f, "bind error: {}", e),
            Error::Relation(e) => write!(f, "relation error: {}", e),
            Error::Executor { message, .. } => write!(f, "executor error: {}", message),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SchemaErrorKind::AmbiguousPrimaryKey => "ambiguous primary key",
            SchemaErrorKind::MissingPrimaryKey => "missing primary key",
            SchemaErrorKind::MissingJunctionTable => "missing junction table",
            SchemaErrorKind::UnknownRelation => "unknown relation",
            SchemaErrorKind::UnknownConnection => "unknown connection",
        };
        write!(f, "{}: {}", kind, self.message)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BuildErrorKind::MissingTable => "missing table",
            BuildErrorKind::AmbiguousFrom => "ambiguous FROM",
            BuildErrorKind::ValueCountMismatch => "value count mismatch",
            BuildErrorKind::EmptyClause => "empty clause",
        };
        write!(f, "{}: {}", kind, self.message)
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(col) => write!(
                f,
                "column '{}': expected {}, got {}",
                col, self.expected, self.actual
            ),
            None => write!(f, "expected {}, got {}", self.expected, self.actual),
        }
    }
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            RelationErrorKind::MissingKeyValue => "missing key value",
            RelationErrorKind::KindMismatch => "relation kind mismatch",
        };
        write!(f, "{}: {}", kind, self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Executor {
                source: Some(src), ..
            } => Some(src.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias for rowmap operations.
pub type Result<T> = std::result::Result<T, Error>;
