//! Integration tests for configuration loading

use relay_config::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn missing_file_yields_defaults() {
    let config = Config::load(std::path::Path::new("/nonexistent/relay.toml"))
        .await
        .unwrap();
    assert_eq!(config.telemetry.allowed_categories, vec!["all"]);
    assert!(config.runtime.allow_blocking);
}

#[tokio::test]
async fn partial_file_fills_remaining_sections_with_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[telemetry]
allowed_categories = ["exception", "internal"]

[validation]
max_issues = 5
"#
    )
    .unwrap();

    let config = Config::load(file.path()).await.unwrap();
    assert_eq!(
        config.telemetry.allowed_categories,
        vec!["exception", "internal"]
    );
    assert_eq!(config.validation.max_issues, 5);
    // untouched section keeps its defaults
    assert!(!config.runtime.expose_defect_messages);
    assert!(config.validation.redact_keys.iter().any(|k| k == "token"));
}

#[tokio::test]
async fn malformed_file_is_a_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "telemetry = 12").unwrap();

    let err = Config::load(file.path()).await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.tag(), "ConfigError");
}
