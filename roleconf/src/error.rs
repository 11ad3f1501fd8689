use std::fmt;

use crate::version::ServerVersion;

/// Failure reported by an engine while talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[cfg(feature = "pg")]
    #[error("sqlx `{0}`")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

/// Which of the two mutation statements failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Set,
    Reset,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Set => f.write_str("alter"),
            StatementKind::Reset => f.write_str("alter reset"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("postgresql_alter_role resource is not supported for this Postgres version ({0})")]
    UnsupportedFeature(ServerVersion),

    #[error("invalid postgresql_alter_role: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("could not start transaction: {0}")]
    Transaction(#[source] DbError),

    #[error("could not execute {kind} query: {source}")]
    Statement {
        kind: StatementKind,
        #[source]
        source: DbError,
    },

    #[error("could not commit transaction: {0}")]
    Commit(#[source] DbError),

    #[error("error reading alter role: {0}")]
    Query(#[source] DbError),

    #[error("PostgreSQL alter role ({0}) committed but not found on read")]
    MissingAfterCreate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
