//! SQL text for the two role mutations and the catalog lookup.
//!
//! Every operand, the parameter value included, is quoted as an identifier
//! (`"..."`), never as a string literal. Building never fails: invalid names
//! or values are reported by the server when the statement runs.

/// Quotes `name` as a PostgreSQL identifier.
///
/// Embedded double quotes are doubled and anything from the first NUL byte
/// on is dropped, as the server would stop reading there anyway.
pub fn quote_identifier(name: &str) -> String {
    let name = match name.find('\0') {
        Some(end) => &name[..end],
        None => name,
    };

    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Reverses [`quote_identifier`] when `value` is exactly one quoted
/// identifier, as the server writes list-valued parameters such as
/// `search_path` back into `rolconfig`. Anything else yields `None`.
pub fn unquote_identifier(value: &str) -> Option<String> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    let mut unquoted = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c == '"' && chars.next() != Some('"') {
            return None;
        }
        unquoted.push(c);
    }

    Some(unquoted)
}

/// `ALTER ROLE "<role>" SET "<key>" TO "<value>"`
pub fn set(role: &str, key: &str, value: &str) -> String {
    format!(
        "ALTER ROLE {} SET {} TO {}",
        quote_identifier(role),
        quote_identifier(key),
        quote_identifier(value)
    )
}

/// `ALTER ROLE "<role>" RESET "<key>"`
pub fn reset(role: &str, key: &str) -> String {
    format!(
        "ALTER ROLE {} RESET {}",
        quote_identifier(role),
        quote_identifier(key)
    )
}

/// Looks a role up by name (`$1`) and returns its whole `rolconfig` array.
pub fn role_config_query() -> String {
    r#"
    SELECT rolname AS role, rolconfig AS config
    FROM pg_catalog.pg_roles
    WHERE rolname = $1
    "#
    .to_owned()
}

/// Finds `key` in a `rolconfig` array of `name=value` entries.
///
/// Parameter names compare case-insensitively, values are everything after
/// the first `=`.
pub fn find_parameter<'a, S: AsRef<str>>(config: &'a [S], key: &str) -> Option<&'a str> {
    config
        .iter()
        .filter_map(|entry| entry.as_ref().split_once('='))
        .filter(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
        .last()
}
