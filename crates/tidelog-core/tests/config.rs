use tidelog_core::{CoreError, EngineConfig};
use tidelog_parser::ParserLimits;

#[test]
fn partial_limits_keep_remaining_defaults() {
    let config = EngineConfig::from_toml_str(
        r#"
        [limits]
        date_sample_size = 40
        max_reported_row_errors = 5
        "#,
    )
    .expect("parse config");

    assert_eq!(config.limits.date_sample_size, 40);
    assert_eq!(config.limits.max_reported_row_errors, 5);
    assert_eq!(
        config.limits.ambiguity_threshold,
        ParserLimits::default().ambiguity_threshold
    );
}

#[test]
fn empty_config_is_default() {
    let config = EngineConfig::from_toml_str("").expect("parse config");
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn malformed_config_is_an_error() {
    let err = EngineConfig::from_toml_str("[limits]\ndate_sample_size = \"many\"")
        .expect_err("type mismatch");
    assert!(matches!(err, CoreError::Toml(_)));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join("tidelog-config-that-does-not-exist.toml");
    let config = EngineConfig::load(&path).expect("load");
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn config_file_is_loaded() {
    let path = std::env::temp_dir().join(format!("tidelog-config-{}.toml", std::process::id()));
    std::fs::write(&path, "[limits]\npreamble_scan_limit = 3\n").expect("write config");

    let config = EngineConfig::load(&path).expect("load");
    std::fs::remove_file(&path).ok();

    assert_eq!(config.limits.preamble_scan_limit, 3);
}
