use docgate_config::{ConfigError, ConfigLoader, EnvResolver, Transport};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_yaml_file_with_env_references() {
    std::env::set_var("DOCGATE_IT_DB_PATH", "/tmp/docgate-it.db");
    let dir = tempdir().unwrap();
    let path = dir.path().join("docgate.yaml");
    fs::write(
        &path,
        r#"
store:
  url: "sqlite://${DOCGATE_IT_DB_PATH}"
  max_connections: "${DB_IT_POOL:3}"
server:
  transport: http
  http_addr: "0.0.0.0:9000"
governance:
  allow: ["*"]
  deny: ["delete_item"]
  max_concurrency: 2
"#,
    )
    .unwrap();

    let config = ConfigLoader::default().load_from_file(&path).unwrap();
    assert_eq!(config.store.url, "sqlite:///tmp/docgate-it.db");
    assert_eq!(config.store.max_connections, Some(3));
    assert_eq!(config.server.transport, Transport::Http);
    assert_eq!(config.server.http_addr, "0.0.0.0:9000");
    assert_eq!(config.governance.deny, vec!["delete_item"]);
    assert_eq!(config.governance.max_concurrency, 2);

    std::env::remove_var("DOCGATE_IT_DB_PATH");
}

#[test]
fn loads_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docgate.json");
    fs::write(&path, r#"{"store": {"url": "memory"}}"#).unwrap();

    let config = ConfigLoader::default().load_from_file(&path).unwrap();
    assert_eq!(config.store.url, "memory");
    assert_eq!(config.server.transport, Transport::Stdio);
}

#[test]
fn non_whitelisted_variable_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docgate.yaml");
    fs::write(&path, "store:\n  url: \"${HOME}\"\n").unwrap();

    let err = ConfigLoader::new(EnvResolver::default()).load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Env(_)), "got {err:?}");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = ConfigLoader::default().load_from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn whole_references_keep_string_fields_as_strings() {
    std::env::set_var("DOCGATE_IT_TOOL", "42");
    std::env::set_var("DOCGATE_IT_CONCURRENCY", "6");
    let dir = tempdir().unwrap();
    let path = dir.path().join("docgate.yaml");
    fs::write(
        &path,
        r#"
store:
  url: memory
governance:
  deny: ["${DOCGATE_IT_TOOL}"]
  max_concurrency: "${DOCGATE_IT_CONCURRENCY}"
"#,
    )
    .unwrap();

    let config = ConfigLoader::default().load_from_file(&path).unwrap();
    assert_eq!(config.governance.deny, vec!["42"]);
    assert_eq!(config.governance.max_concurrency, 6);

    std::env::remove_var("DOCGATE_IT_TOOL");
    std::env::remove_var("DOCGATE_IT_CONCURRENCY");
}
