//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use repl_playground::cli::{parse_args_from, Args};
use repl_playground::config::{Config, ConfigError};

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("repl-playground")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.host.is_none());
    assert!(result.port.is_none());
    assert!(result.config.is_none());
    assert!(result.assets.is_none());
    assert!(!result.no_share);
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-H",
        "127.0.0.1",
        "-p",
        "8080",
        "-a",
        "web",
        "-s",
        "shared",
        "-t",
        "120",
        "-l",
        "debug",
    ]))
    .unwrap();

    assert_eq!(result.host.unwrap().to_string(), "127.0.0.1");
    assert_eq!(result.port, Some(8080));
    assert_eq!(result.assets, Some(PathBuf::from("web")));
    assert_eq!(result.share_dir, Some(PathBuf::from("shared")));
    assert_eq!(result.idle_timeout, Some(120));
    assert_eq!(result.log_level, Some("debug".to_string()));
}

#[test]
fn test_cli_rejects_bad_values() {
    assert!(parse_args_from(args(&["-p", "70000"])).is_err());
    assert!(parse_args_from(args(&["-t", "soon"])).is_err());
    assert!(parse_args_from(args(&["-H"])).is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_defaults_without_file() {
    let config = Config::load(&Args::default()).unwrap();

    assert!(config.share.enabled);
    assert_eq!(config.sessions.gc_interval_secs, 1);
}

#[test]
fn test_config_file_loading() {
    let file = config_file(
        r#"{
            "server": { "host": "127.0.0.1", "port": 9100, "graceful_shutdown": false },
            "sessions": { "idle_timeout_secs": 30, "gc_interval_secs": 2 },
            "share": { "dir": "/srv/snippets", "extension": "scm" }
        }"#,
    );

    let cli = parse_args_from(args(&["-c", file.path().to_str().unwrap()])).unwrap();
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.sessions.idle_timeout_secs, 30);
    assert_eq!(config.share.extension, "scm");

    let gc = config.gc_config();
    assert_eq!(gc.interval, Duration::from_secs(2));
    assert_eq!(gc.idle_timeout, Duration::from_secs(30));

    let server = config.to_server_config().unwrap();
    assert!(!server.graceful_shutdown);
}

#[test]
fn test_cli_overrides_config_file() {
    let file = config_file(r#"{ "server": { "port": 9100 }, "share": { "enabled": true } }"#);

    let cli = parse_args_from(args(&[
        "-c",
        file.path().to_str().unwrap(),
        "-p",
        "9200",
        "--no-share",
    ]))
    .unwrap();
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.server.port, 9200);
    assert!(config.snippet_store().is_none());
}

#[test]
fn test_config_rejects_zero_gc_interval() {
    let file = config_file(r#"{ "sessions": { "gc_interval_secs": 0 } }"#);

    let cli = Args {
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };
    assert!(matches!(
        Config::load(&cli),
        Err(ConfigError::InvalidGcInterval)
    ));
}

#[test]
fn test_config_rejects_bad_host() {
    let file = config_file(r#"{ "server": { "host": "localhost:80" } }"#);

    let cli = Args {
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };
    assert!(matches!(
        Config::load(&cli),
        Err(ConfigError::InvalidHost(_))
    ));
}

#[test]
fn test_missing_config_file() {
    let cli = parse_args_from(args(&["-c", "/nonexistent/playground.json"])).unwrap();
    assert!(matches!(Config::load(&cli), Err(ConfigError::Io(_))));
}
