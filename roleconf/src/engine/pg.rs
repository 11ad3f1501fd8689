use async_trait::async_trait;
use sqlx::{pool::PoolConnection, postgres::PgPoolOptions, PgConnection, PgPool, Postgres};

use crate::{
    config::Config,
    engine::{Engine, QueryAble, RoleConfig, Transaction},
    error::DbError,
    statement,
    version::ServerVersion,
};

#[derive(Debug, Clone)]
pub struct Pg {
    pool: PgPool,
    version: ServerVersion,
}

impl Pg {
    pub fn new(pool: &PgPool, version: ServerVersion) -> Self {
        Self {
            pool: pool.clone(),
            version,
        }
    }

    /// Wraps `pool`, asking the server for its version once.
    pub async fn detect(pool: &PgPool) -> Result<Self, DbError> {
        let version = server_version(pool).await?;

        tracing::debug!(%version, "detected postgres server version");

        Ok(Self::new(pool, version))
    }

    pub async fn connect(config: &Config) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;

        Self::detect(&pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn server_version(pool: &PgPool) -> Result<ServerVersion, DbError> {
    let num = sqlx::query_scalar::<_, String>("SHOW server_version_num")
        .fetch_one(pool)
        .await?;

    let num = num
        .trim()
        .parse::<u32>()
        .map_err(|e| anyhow::anyhow!("invalid server_version_num `{num}`: {e}"))?;

    Ok(ServerVersion::from_num(num))
}

async fn fetch_role_config(
    conn: &mut PgConnection,
    role: &str,
) -> Result<Option<RoleConfig>, DbError> {
    let query = statement::role_config_query();

    let row = sqlx::query_as::<_, RoleConfig>(query.as_str())
        .bind(role)
        .fetch_optional(conn)
        .await?;

    Ok(row)
}

#[async_trait]
impl Engine for Pg {
    fn version(&self) -> ServerVersion {
        self.version
    }

    async fn acquire(&self) -> Result<Box<dyn QueryAble>, DbError> {
        Ok(Box::new(PgConn(self.pool.acquire().await?)))
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>, DbError> {
        Ok(Box::new(PgTransaction(self.pool.begin().await?)))
    }
}

pub struct PgConn(PoolConnection<Postgres>);

#[async_trait]
impl QueryAble for PgConn {
    async fn role_config(&mut self, role: &str) -> Result<Option<RoleConfig>, DbError> {
        fetch_role_config(&mut self.0, role).await
    }
}

/// Rolled back by sqlx when dropped uncommitted.
pub struct PgTransaction(sqlx::Transaction<'static, Postgres>);

#[async_trait]
impl QueryAble for PgTransaction {
    async fn role_config(&mut self, role: &str) -> Result<Option<RoleConfig>, DbError> {
        fetch_role_config(&mut self.0, role).await
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn execute(&mut self, statement: &str) -> Result<(), DbError> {
        sqlx::query(statement).execute(&mut *self.0).await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        self.0.commit().await?;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        self.0.rollback().await?;

        Ok(())
    }
}
