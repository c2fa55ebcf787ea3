//! Configuration resolution tests
//!
//! These touch process environment variables, so they run serially.

use festive_common::config::{
    ConfigOverrides, ServiceConfig, ENV_BIND_ADDRESS, ENV_CONFIG_FILE, ENV_DATABASE_PATH, ENV_PORT,
};
use festive_common::Error;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;

fn clear_env() {
    for name in [ENV_BIND_ADDRESS, ENV_CONFIG_FILE, ENV_DATABASE_PATH, ENV_PORT] {
        std::env::remove_var(name);
    }
}

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();
    let config = ServiceConfig::resolve(&ConfigOverrides::default()).unwrap();
    assert_eq!(config.database_path, PathBuf::from("festiveconnect.db"));
    assert_eq!(config.bind_address, "0.0.0.0:8080");
}

#[test]
#[serial]
fn test_port_variable_changes_default_bind() {
    clear_env();
    std::env::set_var(ENV_PORT, "9090");
    let config = ServiceConfig::resolve(&ConfigOverrides::default()).unwrap();
    assert_eq!(config.bind_address, "0.0.0.0:9090");

    std::env::set_var(ENV_PORT, "not-a-port");
    let err = ServiceConfig::resolve(&ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    clear_env();
}

#[test]
#[serial]
fn test_file_values_apply_below_environment() {
    clear_env();
    let file = config_file(
        r#"
        database_path = "/var/lib/festive/catalog.db"
        bind_address = "127.0.0.1:7000"
        "#,
    );

    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..ConfigOverrides::default()
    };

    let config = ServiceConfig::resolve(&overrides).unwrap();
    assert_eq!(config.database_path, PathBuf::from("/var/lib/festive/catalog.db"));
    assert_eq!(config.bind_address, "127.0.0.1:7000");

    std::env::set_var(ENV_DATABASE_PATH, "/tmp/from-env.db");
    let config = ServiceConfig::resolve(&overrides).unwrap();
    assert_eq!(config.database_path, PathBuf::from("/tmp/from-env.db"));
    assert_eq!(config.bind_address, "127.0.0.1:7000");
    clear_env();
}

#[test]
#[serial]
fn test_command_line_wins() {
    clear_env();
    std::env::set_var(ENV_BIND_ADDRESS, "127.0.0.1:1111");
    let overrides = ConfigOverrides {
        bind_address: Some("127.0.0.1:2222".to_string()),
        database_path: Some(PathBuf::from("cli.db")),
        config_file: None,
    };

    let config = ServiceConfig::resolve(&overrides).unwrap();
    assert_eq!(config.bind_address, "127.0.0.1:2222");
    assert_eq!(config.database_path, PathBuf::from("cli.db"));
    clear_env();
}

#[test]
#[serial]
fn test_config_file_from_environment() {
    clear_env();
    let file = config_file(r#"database_path = "env-file.db""#);
    std::env::set_var(ENV_CONFIG_FILE, file.path());

    let config = ServiceConfig::resolve(&ConfigOverrides::default()).unwrap();
    assert_eq!(config.database_path, PathBuf::from("env-file.db"));
    clear_env();
}

#[test]
#[serial]
fn test_bad_config_file_is_reported() {
    clear_env();
    let file = config_file("database_path = [1, 2]");
    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..ConfigOverrides::default()
    };
    assert!(matches!(ServiceConfig::resolve(&overrides), Err(Error::Config(_))));

    let missing = ConfigOverrides {
        config_file: Some(PathBuf::from("/nonexistent/festive.toml")),
        ..ConfigOverrides::default()
    };
    assert!(matches!(ServiceConfig::resolve(&missing), Err(Error::Config(_))));
}
