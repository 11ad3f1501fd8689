use roleconf::{AlterRole, Error, ResourceData, ResourceState, RoleParameter, StatementKind};

pub fn data(role: &str, key: &str, value: &str) -> ResourceData {
    ResourceData::new(RoleParameter::new(role, key, value))
}

pub async fn test_create(alter_role: &AlterRole, role: &str) -> anyhow::Result<()> {
    let mut d = data(role, "search_path", "public");
    alter_role.create(&mut d).await?;

    assert_eq!(d.state(), ResourceState::Present);
    assert_eq!(d.id(), Some(format!("{role}_search_path_public").as_str()));
    assert_eq!(d.binding.value, "public");

    let mut refreshed = data(role, "search_path", "public");
    alter_role.read(&mut refreshed).await?;

    assert_eq!(refreshed.state(), ResourceState::Present);
    assert_eq!(refreshed.id(), d.id());

    Ok(())
}

pub async fn test_create_quoted_value(alter_role: &AlterRole, role: &str) -> anyhow::Result<()> {
    for value in ["Sales", "My \"EU\" Schema"] {
        let mut d = data(role, "search_path", value);
        alter_role.create(&mut d).await?;

        assert_eq!(d.state(), ResourceState::Present);
        assert_eq!(d.binding.value, value);
        assert_eq!(d.id(), Some(format!("{role}_search_path_{value}").as_str()));

        let mut refreshed = data(role, "search_path", value);
        refreshed.id = d.id.clone();
        alter_role.read(&mut refreshed).await?;

        assert_eq!(refreshed.state(), ResourceState::Present);
        assert_eq!(refreshed, d);
    }

    Ok(())
}

pub async fn test_create_replaces_value(alter_role: &AlterRole, role: &str) -> anyhow::Result<()> {
    alter_role
        .create(&mut data(role, "statement_timeout", "1000"))
        .await?;

    let mut d = data(role, "statement_timeout", "2000");
    alter_role.create(&mut d).await?;

    let mut old = data(role, "statement_timeout", "1000");
    alter_role.read(&mut old).await?;

    assert_eq!(old.state(), ResourceState::Present);
    assert_eq!(old.binding.value, "2000");
    assert_eq!(old.id(), d.id());

    Ok(())
}

pub async fn test_create_is_atomic(alter_role: &AlterRole, role: &str) -> anyhow::Result<()> {
    alter_role.create(&mut data(role, "work_mem", "64MB")).await?;

    let mut d = data(role, "work_mem", "lots");
    let err = alter_role.create(&mut d).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Statement {
            kind: StatementKind::Set,
            ..
        }
    ));
    assert_eq!(d.state(), ResourceState::Absent);
    assert_eq!(d.id(), None);

    let mut before = data(role, "work_mem", "64MB");
    alter_role.read(&mut before).await?;

    assert_eq!(before.state(), ResourceState::Present);
    assert_eq!(before.binding.value, "64MB");

    Ok(())
}

pub async fn test_create_unknown_role(alter_role: &AlterRole) -> anyhow::Result<()> {
    let mut d = data("roleconf_no_such_role", "search_path", "public");
    let err = alter_role.create(&mut d).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Statement {
            kind: StatementKind::Reset,
            ..
        }
    ));
    assert!(err.to_string().starts_with("could not execute alter reset query"));
    assert_eq!(d.state(), ResourceState::Absent);

    Ok(())
}

pub async fn test_delete(alter_role: &AlterRole, role: &str) -> anyhow::Result<()> {
    let mut d = data(role, "application_name", "roleconf");
    alter_role.create(&mut d).await?;
    alter_role.delete(&mut d).await?;

    assert_eq!(d.state(), ResourceState::Absent);
    assert_eq!(d.id(), Some(format!("{role}_application_name_roleconf").as_str()));

    alter_role.read(&mut d).await?;

    assert_eq!(d.state(), ResourceState::Absent);
    assert_eq!(d.id(), None);

    Ok(())
}

pub async fn test_read_missing_key(alter_role: &AlterRole, role: &str) -> anyhow::Result<()> {
    alter_role
        .create(&mut data(role, "search_path", "public"))
        .await?;

    let mut d = data(role, "lock_timeout", "100");
    d.id = Some(d.binding.id());
    alter_role.read(&mut d).await?;

    assert_eq!(d.state(), ResourceState::Absent);
    assert_eq!(d.id(), None);

    Ok(())
}

pub async fn test_read_missing_role(alter_role: &AlterRole) -> anyhow::Result<()> {
    let mut d = data("roleconf_no_such_role", "search_path", "public");
    alter_role.read(&mut d).await?;

    assert_eq!(d.state(), ResourceState::Absent);
    assert_eq!(d.id(), None);

    Ok(())
}

pub async fn test_unsupported(alter_role: &AlterRole, role: &str) -> anyhow::Result<()> {
    let mut d = data(role, "search_path", "public");

    let create = alter_role.create(&mut d).await.unwrap_err();
    let read = alter_role.read(&mut d).await.unwrap_err();
    let delete = alter_role.delete(&mut d).await.unwrap_err();

    for err in [create, read, delete] {
        assert!(matches!(err, Error::UnsupportedFeature(_)));
        assert!(err
            .to_string()
            .starts_with("postgresql_alter_role resource is not supported for this Postgres version"));
    }

    assert_eq!(d.state(), ResourceState::Absent);

    Ok(())
}
