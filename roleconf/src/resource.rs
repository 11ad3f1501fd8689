use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    engine::{Engine, Transaction},
    error::{Error, Result, StatementKind},
    identity, statement,
    version::Feature,
};

/// One `ALTER ROLE <role> SET <key> TO <value>` binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RoleParameter {
    #[serde(rename = "alter_role")]
    #[validate(length(min = 1))]
    pub role: String,

    #[serde(rename = "alter_parameter_key")]
    #[validate(length(min = 1))]
    pub key: String,

    #[serde(rename = "alter_parameter_value")]
    pub value: String,
}

impl RoleParameter {
    pub fn new(role: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn id(&self) -> String {
        identity::derive(&self.role, &self.key, &self.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResourceState {
    #[default]
    Absent,
    Pending,
    Present,
}

/// What the reconciliation framework hands to every lifecycle call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(flatten)]
    pub binding: RoleParameter,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(skip)]
    pub state: ResourceState,
}

impl ResourceData {
    pub fn new(binding: RoleParameter) -> Self {
        Self {
            binding,
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    fn mark_present(&mut self) {
        self.state = ResourceState::Present;
        self.id = Some(self.binding.id());
    }

    fn mark_gone(&mut self) {
        self.state = ResourceState::Absent;
        self.id = None;
    }
}

/// Create, read and delete for `postgresql_alter_role`.
#[derive(Clone)]
pub struct AlterRole {
    pub(crate) engine: Box<dyn Engine>,
}

impl AlterRole {
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    fn ensure_supported(&self) -> Result<()> {
        let version = self.engine.version();

        if !version.supports(Feature::Privileges) {
            return Err(Error::UnsupportedFeature(version));
        }

        Ok(())
    }

    /// Resets then sets the parameter in one transaction and reads it back.
    pub async fn create(&self, d: &mut ResourceData) -> Result<()> {
        self.ensure_supported()?;
        d.binding.validate()?;

        let RoleParameter { role, key, value } = &d.binding;
        let statements = [
            (StatementKind::Reset, statement::reset(role, key)),
            (StatementKind::Set, statement::set(role, key, value)),
        ];

        d.state = ResourceState::Pending;

        if let Err(err) = self.run(&statements).await {
            d.state = ResourceState::Absent;
            return Err(err);
        }

        d.mark_present();
        let id = d.binding.id();

        self.read_alter_role(d).await?;

        if d.state == ResourceState::Absent {
            tracing::error!(id = %id, "PostgreSQL alter role committed but not found on read");
            return Err(Error::MissingAfterCreate(id));
        }

        tracing::info!(id = %id, "PostgreSQL alter role created");

        Ok(())
    }

    pub async fn read(&self, d: &mut ResourceData) -> Result<()> {
        self.ensure_supported()?;

        self.read_alter_role(d).await
    }

    /// Resets the parameter. The stored identity is left for the caller to
    /// clear.
    pub async fn delete(&self, d: &mut ResourceData) -> Result<()> {
        self.ensure_supported()?;

        let RoleParameter { role, key, .. } = &d.binding;
        let statements = [(StatementKind::Reset, statement::reset(role, key))];

        self.run(&statements).await?;

        d.state = ResourceState::Absent;

        tracing::info!(id = d.id(), "PostgreSQL alter role deleted");

        Ok(())
    }

    async fn read_alter_role(&self, d: &mut ResourceData) -> Result<()> {
        let mut conn = self.engine.acquire().await.map_err(Error::Query)?;
        let row = conn
            .role_config(&d.binding.role)
            .await
            .map_err(Error::Query)?;

        let value = row
            .as_ref()
            .and_then(|row| row.parameter(&d.binding.key).map(|value| (row, value)));

        let Some((row, value)) = value else {
            tracing::warn!(id = d.id(), "PostgreSQL alter role not found");
            d.mark_gone();
            return Ok(());
        };

        // list parameters come back re-quoted, e.g. `search_path="Sales"`
        let observed = statement::unquote_identifier(value).unwrap_or_else(|| value.to_owned());
        if observed != d.binding.value {
            d.binding.value = observed;
        }

        d.binding.role = row.role.to_owned();
        d.mark_present();

        Ok(())
    }

    /// Runs `statements` in a single transaction. The transaction is always
    /// finished before returning: committed, rolled back, or dropped.
    async fn run(&self, statements: &[(StatementKind, String)]) -> Result<()> {
        let mut tx = self.engine.begin().await.map_err(Error::Transaction)?;

        for (kind, sql) in statements {
            tracing::debug!(statement = %sql, "executing");

            if let Err(source) = tx.execute(sql).await {
                rollback(tx).await;

                return Err(Error::Statement {
                    kind: *kind,
                    source,
                });
            }
        }

        tx.commit().await.map_err(Error::Commit)
    }
}

async fn rollback(tx: Box<dyn Transaction>) {
    if let Err(e) = tx.rollback().await {
        tracing::error!(error = %e, "could not rollback transaction");
    }
}
