use std::io::Write;
use std::path::Path;

use brickstore::config::{Settings, DEFAULT_LOG_FILTER};
use brickstore::persist::PersistenceMode;

#[test]
fn explicit_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "database = \"bricks.db\"\nbind = \"0.0.0.0:9000\"").unwrap();
    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.database, "bricks.db");
    assert_eq!(settings.bind, "0.0.0.0:9000");
    assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    assert_eq!(settings.persistence_mode(), PersistenceMode::File("bricks.db".to_string()));
}

#[test]
fn missing_explicit_file_is_a_config_error() {
    let result = Settings::load(Some(Path::new("/nonexistent/brickstore.toml")));
    assert!(matches!(result, Err(brickstore::error::BrickError::Config(_))));
}

#[test]
fn default_database_lives_in_memory() {
    assert_eq!(Settings::default().persistence_mode(), PersistenceMode::InMemory);
}
