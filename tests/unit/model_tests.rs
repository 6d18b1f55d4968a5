//! Unit tests for the pod and checkpoint result models, including the
//! wire shape of serialized results.

use std::path::{Path, PathBuf};

use podmigd::migration::MigrationPhase;
use podmigd::models::checkpoint::MigrationResult;
use podmigd::models::pod::{Pod, PodPhase};

// ── pod ──────────────────────────────────────────────────────

#[test]
fn running_constructor_is_migratable() {
    let pod = Pod::running("pod-a", "frontend", vec!["web".into()]);
    assert_eq!(pod.phase, PodPhase::Running);
    assert!(pod.is_migratable());
}

#[test]
fn only_running_pods_are_migratable() {
    let mut pod = Pod::running("pod-a", "frontend", vec!["web".into()]);

    for phase in [PodPhase::Pending, PodPhase::Stopped, PodPhase::Failed] {
        pod.phase = phase;
        assert!(!pod.is_migratable(), "{phase:?} must not be migratable");
    }
}

// ── migration result ─────────────────────────────────────────

#[test]
fn result_contains_exactly_the_requested_components() {
    let components = vec!["web".to_owned(), "sidecar".to_owned()];
    let result = MigrationResult::new(Path::new("/ckpt/migration/pod-a"), &components);

    assert_eq!(result.components.len(), components.len());
    for component in &components {
        assert_eq!(
            result.components[component].checkpoint_path,
            PathBuf::from(format!("/ckpt/migration/pod-a/{component}"))
        );
    }
}

#[test]
fn result_serializes_with_component_checkpoint_paths() {
    let result = MigrationResult::new(Path::new("/ckpt/migration/pod-a"), &["web".to_owned()]);
    let json = serde_json::to_value(&result).expect("serialize");

    assert_eq!(json["path"], "/ckpt/migration/pod-a");
    assert_eq!(
        json["components"]["web"]["checkpoint_path"],
        "/ckpt/migration/pod-a/web"
    );
}

#[test]
fn phase_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(MigrationPhase::AwaitingCapture).expect("serialize"),
        "awaiting_capture"
    );
    assert_eq!(
        serde_json::to_value(MigrationPhase::CaptureComplete).expect("serialize"),
        "capture_complete"
    );
    assert_eq!(
        serde_json::to_value(MigrationPhase::Released).expect("serialize"),
        "released"
    );
}
