use kinship_core::db::migrations::latest_version;
use kinship_core::{ConfigError, CoreConfig, LedgerService, SqliteMessageRepository};
use uuid::Uuid;

#[test]
fn config_file_selects_database_and_ledger_policy() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("kinship.sqlite3");
    let config_path = dir.path().join("kinship.toml");
    std::fs::write(
        &config_path,
        format!(
            "[database]\npath = {:?}\n\n[ledger]\nstrict_delivery = true\n",
            db_path.to_str().unwrap()
        ),
    )
    .unwrap();

    let config = CoreConfig::from_file(&config_path).unwrap();
    assert!(config.ledger.strict_delivery);

    let conn = config.open_database().unwrap();
    assert!(db_path.exists());
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    let ledger = LedgerService::with_config(
        SqliteMessageRepository::try_new(&conn).unwrap(),
        &config.ledger,
    );
    let content = ledger.create_content(None, None).unwrap();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    ledger.deliver(alice, bob, content).unwrap();
    assert!(ledger.deliver(alice, bob, content).is_err());
}

#[test]
fn default_config_opens_in_memory_and_skips_file_logging() {
    let config = CoreConfig::default();
    assert!(config.open_database().is_ok());
    assert_eq!(config.init_logging(), Ok(false));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CoreConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
