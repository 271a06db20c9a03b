// Integration tests for the global logging pipeline
// Note: Logger::init installs a global subscriber, so this file holds a single test

mod common;

use flushlog::domain::models::{CoreConfig, Encoding, LoggerConfig, OutputConfig, ServiceInfo};
use flushlog::logging::Logger;
use tracing::{info, instrument, warn, Instrument};

#[tokio::test]
async fn test_logging_comprehensive() {
    let dir = common::temp_dir();
    let json_path = dir.path().join("app.json.log");
    let console_path = dir.path().join("app.console.log");

    let config = LoggerConfig {
        cores: vec![
            CoreConfig {
                level: "debug".to_string(),
                encoding: Encoding::Json,
                stacktrace: "error".to_string(),
                output: OutputConfig {
                    path: json_path.clone(),
                    flush_seconds: 60,
                    ..OutputConfig::default()
                },
            },
            CoreConfig {
                level: "warn".to_string(),
                encoding: Encoding::Console,
                stacktrace: String::new(),
                output: OutputConfig {
                    path: console_path.clone(),
                    ..OutputConfig::default()
                },
            },
        ],
        caller: true,
        ..LoggerConfig::default()
    };

    let service = ServiceInfo {
        project: "testProject".to_string(),
        service: "testService".to_string(),
        branch: "testBranch".to_string(),
        version: "testVersion".to_string(),
    };

    let guard = Logger::init(&config, service).unwrap();
    assert_eq!(guard.sinks().len(), 2);

    async {
        info!("Works perfectly");
        info!(key = "value", "Test message with fields");
        warn!("Something looks off");
        assert_eq!(instrumented_add(5, 7), 12);
    }
    .instrument(guard.service_span())
    .await;

    // Nothing reaches disk before a flush with a 60s timer
    assert!(common::read(&json_path).is_empty());

    guard.shutdown().await.unwrap();

    let contents = common::read(&json_path);
    let records: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let works = records
        .iter()
        .find(|r| r["message"] == "Works perfectly")
        .expect("JSON log should contain basic message");
    assert_eq!(works["level"], "INFO");
    assert_eq!(works["span"]["service"], "testService");
    assert_eq!(works["span"]["branch"], "testBranch");
    assert!(works["filename"].is_string(), "caller info should be attached");

    assert!(records.iter().any(|r| r["key"] == "value"));
    assert!(records
        .iter()
        .any(|r| r["message"] == "entering instrumented function"));

    let console = common::read(&console_path);
    assert!(console.contains("Something looks off"));
    assert!(!console.contains("Works perfectly"), "console core filters below warn");
}

#[instrument]
fn instrumented_add(a: i32, b: i32) -> i32 {
    info!("entering instrumented function");
    a + b
}
