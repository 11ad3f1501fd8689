use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{error::DbError, statement, version::ServerVersion};

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "pg")]
mod pg;

#[cfg(feature = "memory")]
pub use memory::*;
#[cfg(feature = "pg")]
pub use pg::*;

/// A `pg_roles` row: role name and its `name=value` configuration entries.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "pg", derive(sqlx::FromRow))]
pub struct RoleConfig {
    pub role: String,
    pub config: Option<Vec<String>>,
}

impl RoleConfig {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        statement::find_parameter(self.config.as_deref().unwrap_or_default(), key)
    }
}

/// Anything the catalog can be read through: a plain connection or an open
/// transaction.
#[async_trait]
pub trait QueryAble: Send {
    async fn role_config(&mut self, role: &str) -> Result<Option<RoleConfig>, DbError>;
}

/// A transaction owned by a single lifecycle operation.
///
/// Dropping it without calling [`Transaction::commit`] rolls it back.
#[async_trait]
pub trait Transaction: QueryAble {
    async fn execute(&mut self, statement: &str) -> Result<(), DbError>;
    async fn commit(self: Box<Self>) -> Result<(), DbError>;
    async fn rollback(self: Box<Self>) -> Result<(), DbError>;
}

#[async_trait]
pub trait Engine: DynClone + Send + Sync {
    /// Version of the connected server, known without any round trip.
    fn version(&self) -> ServerVersion;

    async fn acquire(&self) -> Result<Box<dyn QueryAble>, DbError>;

    async fn begin(&self) -> Result<Box<dyn Transaction>, DbError>;
}

dyn_clone::clone_trait_object!(Engine);
