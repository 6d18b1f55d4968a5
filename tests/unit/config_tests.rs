//! Unit tests for configuration parsing and validation.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use podmigd::config::GlobalConfig;
use podmigd::models::pod::PodPhase;
use podmigd::AppError;

#[test]
fn minimal_config_applies_defaults() {
    let config = GlobalConfig::from_toml_str(r#"checkpoint_root = "/var/lib/podmigd""#)
        .expect("minimal config");

    assert_eq!(config.checkpoint_root, PathBuf::from("/var/lib/podmigd"));
    assert_eq!(config.http_port, 8750);
    assert_eq!(config.bind_address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert!(config.static_pods.is_empty());
}

#[test]
fn full_config_parses_static_pods() {
    let toml = r#"
checkpoint_root = "/var/lib/podmigd"
http_port = 9000
bind_address = "0.0.0.0"

[[static_pods]]
uid = "pod-a"
name = "frontend"
phase = "running"
containers = ["web", "sidecar"]

[[static_pods]]
uid = "pod-b"
name = "batch"
phase = "pending"
containers = ["worker"]
"#;
    let config = GlobalConfig::from_toml_str(toml).expect("full config");

    assert_eq!(config.http_port, 9000);
    assert_eq!(config.bind().to_string(), "0.0.0.0:9000");
    assert_eq!(config.static_pods.len(), 2);

    let pod_a = &config.static_pods[0];
    assert_eq!(pod_a.uid, "pod-a");
    assert_eq!(pod_a.name, "frontend");
    assert_eq!(pod_a.phase, PodPhase::Running);
    assert_eq!(pod_a.containers, vec!["web".to_owned(), "sidecar".to_owned()]);

    assert_eq!(config.static_pods[1].phase, PodPhase::Pending);
}

#[test]
fn missing_checkpoint_root_is_rejected() {
    let err = GlobalConfig::from_toml_str("http_port = 9000").expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn empty_checkpoint_root_is_rejected() {
    let err = GlobalConfig::from_toml_str(r#"checkpoint_root = """#).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn unknown_phase_is_rejected() {
    let toml = r#"
checkpoint_root = "/var/lib/podmigd"

[[static_pods]]
uid = "pod-a"
name = "frontend"
phase = "levitating"
containers = []
"#;
    let err = GlobalConfig::from_toml_str(toml).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn duplicate_static_pod_uid_is_rejected() {
    let toml = r#"
checkpoint_root = "/var/lib/podmigd"

[[static_pods]]
uid = "pod-a"
name = "one"
phase = "running"
containers = []

[[static_pods]]
uid = "pod-a"
name = "two"
phase = "running"
containers = []
"#;
    let err = GlobalConfig::from_toml_str(toml).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn empty_static_pod_uid_is_rejected() {
    let toml = r#"
checkpoint_root = "/var/lib/podmigd"

[[static_pods]]
uid = ""
name = "anon"
phase = "running"
containers = []
"#;
    let err = GlobalConfig::from_toml_str(toml).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}
