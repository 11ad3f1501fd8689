use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    engine::{Engine, QueryAble, RoleConfig, Transaction},
    error::DbError,
    statement,
    version::ServerVersion,
};

/// Failures the in-memory server can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Begin,
    Commit,
    Query,
    /// Commit reports success without applying anything.
    LostWrite,
}

#[derive(Debug, Clone, Copy)]
enum ParameterKind {
    Text,
    Integer,
    /// Stored with each element quoted the way the server quotes identifiers.
    List,
}

const PARAMETERS: &[(&str, ParameterKind)] = &[
    ("application_name", ParameterKind::Text),
    ("client_min_messages", ParameterKind::Text),
    ("default_transaction_isolation", ParameterKind::Text),
    ("lock_timeout", ParameterKind::Integer),
    ("search_path", ParameterKind::List),
    ("statement_timeout", ParameterKind::Integer),
    ("temp_tablespaces", ParameterKind::List),
    ("timezone", ParameterKind::Text),
    ("work_mem", ParameterKind::Integer),
];

#[derive(Debug)]
struct Server {
    version: ServerVersion,
    roles: HashMap<String, Vec<String>>,
    statements: Vec<String>,
    faults: HashSet<Fault>,
}

/// In-process stand-in for a PostgreSQL server that understands
/// `ALTER ROLE ... SET/RESET` and the `pg_roles` lookup.
#[derive(Debug, Clone)]
pub struct Memory(Arc<RwLock<Server>>);

impl Memory {
    pub fn new() -> Self {
        Self::with_version(ServerVersion::new(16, 0, 0))
    }

    pub fn with_version(version: ServerVersion) -> Self {
        Self(Arc::new(RwLock::new(Server {
            version,
            roles: HashMap::new(),
            statements: Vec::new(),
            faults: HashSet::new(),
        })))
    }

    pub fn create_role(&self, name: impl Into<String>) {
        self.0.write().roles.entry(name.into()).or_default();
    }

    /// Configuration entries of `role` as `pg_roles.rolconfig` would show them.
    pub fn config_of(&self, role: &str) -> Option<Vec<String>> {
        self.0.read().roles.get(role).cloned()
    }

    /// Every statement handed to a transaction, failed ones included.
    pub fn statements(&self) -> Vec<String> {
        self.0.read().statements.clone()
    }

    pub fn inject(&self, fault: Fault) {
        self.0.write().faults.insert(fault);
    }

    pub fn clear_faults(&self) {
        self.0.write().faults.clear();
    }

    fn fails(&self, fault: Fault) -> bool {
        self.0.read().faults.contains(&fault)
    }

    fn read_role(&self, role: &str, pending: &[Change]) -> Result<Option<RoleConfig>, DbError> {
        if self.fails(Fault::Query) {
            return Err(anyhow!("canceling statement due to user request").into());
        }

        let server = self.0.read();
        let Some(config) = server.roles.get(role) else {
            return Ok(None);
        };

        let mut config = config.clone();
        for change in pending.iter().filter(|c| c.role == role) {
            change.apply(&mut config);
        }

        Ok(Some(RoleConfig {
            role: role.to_owned(),
            config: if config.is_empty() { None } else { Some(config) },
        }))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for Memory {
    fn version(&self) -> ServerVersion {
        self.0.read().version
    }

    async fn acquire(&self) -> Result<Box<dyn QueryAble>, DbError> {
        Ok(Box::new(MemoryConn(self.clone())))
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>, DbError> {
        if self.fails(Fault::Begin) {
            return Err(anyhow!("sorry, too many clients already").into());
        }

        Ok(Box::new(MemoryTransaction {
            memory: self.clone(),
            pending: Vec::new(),
        }))
    }
}

pub struct MemoryConn(Memory);

#[async_trait]
impl QueryAble for MemoryConn {
    async fn role_config(&mut self, role: &str) -> Result<Option<RoleConfig>, DbError> {
        self.0.read_role(role, &[])
    }
}

/// Changes stay local until commit, dropping the transaction discards them.
pub struct MemoryTransaction {
    memory: Memory,
    pending: Vec<Change>,
}

#[async_trait]
impl QueryAble for MemoryTransaction {
    async fn role_config(&mut self, role: &str) -> Result<Option<RoleConfig>, DbError> {
        self.memory.read_role(role, &self.pending)
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn execute(&mut self, statement: &str) -> Result<(), DbError> {
        self.memory.0.write().statements.push(statement.to_owned());

        let mut change = Change::parse(statement)?;

        if !self.memory.0.read().roles.contains_key(&change.role) {
            return Err(anyhow!("role \"{}\" does not exist", change.role).into());
        }

        let kind = check_parameter(&change.key, change.value.as_deref())?;

        if let (ParameterKind::List, Some(value)) = (kind, change.value.as_mut()) {
            *value = quote_list_element(value);
        }

        self.pending.push(change);

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        if self.memory.fails(Fault::Commit) {
            return Err(anyhow!("could not serialize access due to concurrent update").into());
        }

        if self.memory.fails(Fault::LostWrite) {
            return Ok(());
        }

        let mut server = self.memory.0.write();
        for change in self.pending.iter() {
            if let Some(config) = server.roles.get_mut(&change.role) {
                change.apply(config);
            }
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        Ok(())
    }
}

/// A parsed `ALTER ROLE` statement; `value` is `None` for `RESET`.
#[derive(Debug, Clone, PartialEq)]
struct Change {
    role: String,
    key: String,
    value: Option<String>,
}

impl Change {
    fn parse(statement: &str) -> anyhow::Result<Self> {
        use Token::*;

        let tokens = tokenize(statement)?;
        let words = tokens.as_slice();

        match words {
            [Word(alter), Word(role_kw), Ident(role), Word(set), Ident(key), Word(to), Ident(value)]
                if alter.eq_ignore_ascii_case("alter")
                    && role_kw.eq_ignore_ascii_case("role")
                    && set.eq_ignore_ascii_case("set")
                    && to.eq_ignore_ascii_case("to") =>
            {
                Ok(Self {
                    role: role.to_owned(),
                    key: key.to_lowercase(),
                    value: Some(value.to_owned()),
                })
            }
            [Word(alter), Word(role_kw), Ident(role), Word(reset), Ident(key)]
                if alter.eq_ignore_ascii_case("alter")
                    && role_kw.eq_ignore_ascii_case("role")
                    && reset.eq_ignore_ascii_case("reset") =>
            {
                Ok(Self {
                    role: role.to_owned(),
                    key: key.to_lowercase(),
                    value: None,
                })
            }
            _ => bail!("syntax error in `{statement}`"),
        }
    }

    fn apply(&self, config: &mut Vec<String>) {
        let prefix = format!("{}=", self.key);
        let position = config.iter().position(|entry| entry.starts_with(&prefix));

        match (&self.value, position) {
            (Some(value), Some(position)) => config[position] = format!("{prefix}{value}"),
            (Some(value), None) => config.push(format!("{prefix}{value}")),
            (None, Some(position)) => {
                config.remove(position);
            }
            (None, None) => {}
        }
    }
}

fn check_parameter(key: &str, value: Option<&str>) -> anyhow::Result<ParameterKind> {
    let kind = match PARAMETERS.iter().find(|(name, _)| *name == key) {
        Some((_, kind)) => *kind,
        // custom placeholder variables like `app.tenant` are accepted as is
        None if key.contains('.') => ParameterKind::Text,
        None => bail!("unrecognized configuration parameter \"{key}\""),
    };

    if let (ParameterKind::Integer, Some(value)) = (kind, value) {
        let number = value.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        if number.parse::<i64>().is_err() {
            bail!("invalid value for parameter \"{key}\": \"{value}\"");
        }
    }

    Ok(kind)
}

/// Leaves plain lower case names bare and quotes everything else.
/// Reserved keywords, which the server also quotes, are not modelled.
fn quote_list_element(value: &str) -> String {
    let plain = value.starts_with(|c: char| c.is_ascii_lowercase() || c == '_')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if plain {
        value.to_owned()
    } else {
        statement::quote_identifier(value)
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Ident(String),
}

fn tokenize(statement: &str) -> anyhow::Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = statement.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if c == '"' {
            let mut ident = String::new();
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        ident.push('"');
                    }
                    Some('"') => break,
                    Some(c) => ident.push(c),
                    None => bail!("unterminated quoted identifier in `{statement}`"),
                }
            }
            if ident.is_empty() {
                bail!("zero-length delimited identifier in `{statement}`");
            }
            tokens.push(Token::Ident(ident));
            continue;
        }

        let mut word = c.to_string();
        while let Some(c) = chars.peek().filter(|c| !c.is_whitespace() && **c != '"') {
            word.push(*c);
            chars.next();
        }
        tokens.push(Token::Word(word));
    }

    Ok(tokens)
}
