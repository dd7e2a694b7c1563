use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;
use truthguard_common::observability::LogFormat;
use truthguard_config::{ClientMode, PercentRange, TruthGuardConfigLoader};

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_are_overridden_by_prefixed_env() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
version: "0.1"
client:
  mode: remote
  base_url: "${TG_TEST_BACKEND}/analyze"
  timeout_secs: 12
simulation:
  text_manipulated: { min: 80, max: 90 }
logging:
  level: debug
  format: json
"#;
    let p = write_yaml(&tmp, "truthguard.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("TG_TEST_BACKEND", Some("http://10.0.0.5:8000")),
            ("TRUTHGUARD__CLIENT__TIMEOUT_SECS", Some("3")),
        ],
        || {
            let config = TruthGuardConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.version.as_deref(), Some("0.1"));
            assert_eq!(config.client.mode, ClientMode::Remote);
            assert_eq!(config.client.base_url, "http://10.0.0.5:8000/analyze");
            assert_eq!(config.client.timeout_secs, 3);
            assert_eq!(
                config.simulation.text_manipulated,
                PercentRange::new(80.0, 90.0)
            );
            // Untouched sections keep their defaults.
            assert_eq!(
                config.simulation.text_authentic,
                PercentRange::new(72.0, 90.0)
            );
            assert_eq!(config.limits.image_max_bytes, 10 * 1024 * 1024);
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.logging.format, LogFormat::Json);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = TruthGuardConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("optional file may be absent");

    assert_eq!(config.client.base_url, truthguard_config::DEFAULT_BASE_URL);
    assert_eq!(config.client.mode, ClientMode::Remote);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = TruthGuardConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn env_can_switch_to_simulated_mode() {
    temp_env::with_vars(
        [
            ("TRUTHGUARD__CLIENT__MODE", Some("simulated")),
            ("TRUTHGUARD__CLIENT__SEED", Some("42")),
        ],
        || {
            let config = TruthGuardConfigLoader::new().load().expect("env only");
            assert_eq!(config.client.mode, ClientMode::Simulated);
            assert_eq!(config.client.seed, Some(42));
        },
    );
}
