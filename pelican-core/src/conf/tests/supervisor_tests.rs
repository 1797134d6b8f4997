use crate::conf::{ConfigError, SupervisorConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("supervisor.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn empty_file_uses_defaults() {
    let (_dir, path) = write("");
    let cfg = SupervisorConfig::from_file(&path).unwrap();

    assert_eq!(cfg.server.listen, "0.0.0.0:1525");
    assert_eq!(cfg.server.threads, None);
    assert_eq!(cfg.auth.username, "cloud");
    assert_eq!(cfg.auth.password, "pelican");
    assert_eq!(cfg.store.snapshot_path, None);
    assert_eq!(cfg.store.snapshot_interval_secs, 30);
}

#[test]
fn parses_all_sections() {
    let (_dir, path) = write(
        r#"
[server]
listen = "127.0.0.1:9000"
threads = 2
pid_file = "/tmp/pelican.pid"

[auth]
username = "ops"
password = "s3cret"

[store]
snapshot_path = "/var/lib/pelican/registry.json"
snapshot_interval_secs = 5
"#,
    );
    let cfg = SupervisorConfig::from_file(&path).unwrap();

    assert_eq!(cfg.server.listen, "127.0.0.1:9000");
    assert_eq!(cfg.server.threads, Some(2));
    assert_eq!(cfg.server.pid_file.as_deref(), Some("/tmp/pelican.pid"));
    assert_eq!(cfg.auth.username, "ops");
    assert_eq!(
        cfg.store.snapshot_path,
        Some(PathBuf::from("/var/lib/pelican/registry.json"))
    );
    assert_eq!(cfg.store.snapshot_interval().as_secs(), 5);
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempdir().unwrap();
    let err = SupervisorConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn bad_toml_is_parse_error() {
    let (_dir, path) = write("[server\nlisten = ");
    let err = SupervisorConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn unknown_keys_are_rejected() {
    let (_dir, path) = write("[server]\nport = 80\n");
    let err = SupervisorConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn validation_failures() {
    let cases = [
        ("[server]\nlisten = \"localhost\"\n", "server.listen"),
        ("[server]\nthreads = 0\n", "server.threads"),
        ("[auth]\npassword = \"\"\n", "auth"),
        ("[store]\nsnapshot_interval_secs = 0\n", "store.snapshot_interval_secs"),
    ];

    for (toml, expected) in cases {
        let (_dir, path) = write(toml);
        match SupervisorConfig::from_file(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}
