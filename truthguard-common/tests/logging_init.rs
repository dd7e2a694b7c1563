use tempfile::TempDir;
use truthguard_common::observability::{init_logging, LogConfig, LogFormat};

#[test]
fn init_logging_is_idempotent_and_writes_under_configured_dir() {
    let tmp = TempDir::new().unwrap();
    let config = LogConfig {
        app_name: "truthguard-tests",
        log_dir: Some(tmp.path().to_path_buf()),
        format: LogFormat::Json,
        default_filter: "debug".to_string(),
        ..LogConfig::default()
    };

    let first = init_logging(config.clone()).expect("logging initialises");
    assert!(first.starts_with(tmp.path()));
    assert!(first
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("truthguard-tests.log")));

    tracing::info!(target: "tests", "logging.ready");

    // A second call must not try to install another subscriber.
    let second = init_logging(config).expect("second call is a no-op");
    assert_eq!(first, second);
}
