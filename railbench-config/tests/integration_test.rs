//! Integration tests for railbench-config

use railbench_config::domains::logging::{LogFormat, LogLevel};
use railbench_config::*;
use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;

#[test]
fn test_default_config_validation() {
    let config = RailbenchConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("RAILBENCH_TARGET_URL", Some("https://10.0.0.1")),
        ("RAILBENCH_API_TIMEOUT", Some("5")),
        ("RAILBENCH_LOG_LEVEL", Some("debug")),
        ("RAILBENCH_LOAD_LEVEL", Some("3")),
        ("RAILBENCH_RETRY_LIMIT", Some("4")),
        ("RAILBENCH_APPLICATION_FAILURE_THRESHOLD", Some("50")),
    ];

    with_vars(vars, || {
        let loader = ConfigLoader::new();
        let config = loader.from_env().unwrap();

        assert_eq!(config.benchmark.target_url, "https://10.0.0.1");
        assert_eq!(config.http.api_timeout, Duration::from_secs(5));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.benchmark.load_level, Some(3));
        assert_eq!(config.worker.retry_limit, 4);
        assert_eq!(config.scoring.application_failure_threshold, 50);
    });
}

#[test]
fn test_invalid_env_value_is_rejected() {
    with_vars(vec![("RAILBENCH_RETRY_LIMIT", Some("many"))], || {
        let result = ConfigLoader::new().from_env();
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("BENCH_LOG_FORMAT", Some("json"))], || {
        let config = ConfigLoader::with_prefix("BENCH").from_env().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    });
}

#[test]
fn test_yaml_config_serialization() {
    let config = RailbenchConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();

    let parsed: RailbenchConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
    assert_eq!(parsed.scoring, config.scoring);
}

#[test]
fn test_comprehensive_config_file() {
    let yaml = r#"
benchmark:
  target_url: "https://192.168.0.10"
  payment_url: "https://payment.example.com"
  asset_dir: "/srv/assets"
  benchmark_timeout: 90
  load_level: 2
  calendar:
    reservation_start_date: 2020-01-01
    default_available_days: 30

scoring:
  application_weight: 20
  application_failure_threshold: 500

http:
  api_timeout: 10
  user_agent: "railbench-test"

logging:
  level: warn
  format: compact

worker:
  portal_url: "https://portal.example.com"
  retry_limit: 3
  retry_interval: 1
  message_limit: 5
"#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let config = with_vars(
        vec![
            ("RAILBENCH_TARGET_URL", None::<&str>),
            ("RAILBENCH_LOG_LEVEL", None),
        ],
        || ConfigLoader::new().from_file(file.path()).unwrap(),
    );

    assert_eq!(config.benchmark.target_url, "https://192.168.0.10");
    assert_eq!(config.benchmark.benchmark_timeout, Duration::from_secs(90));
    assert_eq!(config.benchmark.load_level, Some(2));
    assert_eq!(config.benchmark.calendar.default_available_days, 30);
    assert_eq!(config.scoring.application_weight, 20);
    assert_eq!(config.scoring.trivial_threshold, 200);
    assert_eq!(config.http.api_timeout, Duration::from_secs(10));
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(config.worker.retry_limit, 3);
    assert_eq!(config.worker.message_limit, 5);
}

#[test]
fn test_invalid_file_fails_validation() {
    let yaml = "scoring:\n  trivial_per_count: 0\n";
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let result = with_vars(vec![("RAILBENCH_RETRY_LIMIT", None::<&str>)], || {
        ConfigLoader::new().from_file(file.path())
    });
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_missing_file() {
    let result = ConfigLoader::new().load(Some("/nonexistent/railbench.yaml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
