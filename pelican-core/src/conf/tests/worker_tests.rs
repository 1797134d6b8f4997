use crate::conf::{ConfigError, WorkerConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("worker.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn defaults_are_valid() {
    let cfg = WorkerConfig::default();
    cfg.validate().unwrap();

    assert_eq!(cfg.supervisor.url, "http://127.0.0.1:1525");
    assert_eq!(cfg.flush.tick(), Duration::from_secs(1));
    assert_eq!(cfg.flush.timeout(), Duration::from_secs(2));
    assert_eq!(cfg.matcher.refresh_interval(), Duration::from_secs(30));
    assert!(cfg.matcher.compile().unwrap().is_match("FATAL: disk full"));
}

#[test]
fn parses_file() {
    let (_dir, path) = write(
        r#"
[supervisor]
url = "https://registry.internal:8443"
username = "worker"
password = "pw"

[flush]
tick_ms = 250
timeout_ms = 500

[matcher]
error_pattern = "panic"
refresh_secs = 10
"#,
    );
    let cfg = WorkerConfig::from_file(&path).unwrap();

    assert_eq!(cfg.supervisor.url, "https://registry.internal:8443");
    assert_eq!(cfg.supervisor.credentials().username, "worker");
    assert_eq!(cfg.flush.tick(), Duration::from_millis(250));
    assert_eq!(cfg.matcher.error_pattern, "panic");
}

#[test]
fn validation_failures() {
    let cases = [
        ("[supervisor]\nurl = \"not a url\"\n", "supervisor.url"),
        ("[supervisor]\nurl = \"ftp://host\"\n", "supervisor.url"),
        ("[supervisor]\nusername = \"\"\n", "supervisor"),
        ("[flush]\ntick_ms = 0\n", "flush.tick_ms"),
        ("[flush]\ntimeout_ms = 0\n", "flush.timeout_ms"),
        ("[matcher]\nrefresh_secs = 0\n", "matcher.refresh_secs"),
        ("[matcher]\nerror_pattern = \"(unclosed\"\n", "matcher.error_pattern"),
    ];

    for (toml, expected) in cases {
        let (_dir, path) = write(toml);
        match WorkerConfig::from_file(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}
