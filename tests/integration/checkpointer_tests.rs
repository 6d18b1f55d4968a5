//! Integration tests for the built-in local checkpointer.

use std::time::Duration;

use podmigd::models::checkpoint::CheckpointManifest;
use podmigd::models::pod::PodPhase;
use podmigd::registry::{InMemoryPodRegistry, PodRegistry};

use super::test_helpers::{local_coordinator, running_pod};

async fn wait_for_phase(registry: &InMemoryPodRegistry, uid: &str, phase: PodPhase) {
    for _ in 0..200 {
        if registry.lookup_by_uid(uid).map(|pod| pod.phase) == Some(phase) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("pod {uid} never reached {phase:?}");
}

#[tokio::test]
async fn writes_a_manifest_per_component() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (coordinator, _registry) = local_coordinator(temp.path(), vec![running_pod("pod-a")]);

    let result = coordinator
        .trigger_migration("pod-a", vec!["web".into(), "sidecar".into()])
        .await
        .expect("migration");

    for component in ["web", "sidecar"] {
        let artifact = &result.components[component].checkpoint_path;
        let raw = std::fs::read(artifact).expect("artifact must exist");
        let manifest: CheckpointManifest = serde_json::from_slice(&raw).expect("valid manifest");
        assert_eq!(manifest.pod_uid, "pod-a");
        assert_eq!(manifest.component, component);
    }
}

#[tokio::test]
async fn pod_is_stopped_after_the_requester_releases() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (coordinator, registry) = local_coordinator(temp.path(), vec![running_pod("pod-a")]);

    coordinator
        .trigger_migration("pod-a", vec!["web".into()])
        .await
        .expect("migration");

    // Finalization runs on the preparer task after the release.
    wait_for_phase(&registry, "pod-a", PodPhase::Stopped).await;
}

#[tokio::test]
async fn artifact_write_failure_still_completes_capture() {
    let temp = tempfile::tempdir().expect("tempdir");
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").expect("write blocker");

    let (coordinator, registry) = local_coordinator(&blocker, vec![running_pod("pod-a")]);

    // No artifact can be written, but the requester must not be parked.
    let result = coordinator
        .trigger_migration("pod-a", vec!["web".into()])
        .await
        .expect("capture must complete");
    assert!(!result.components["web"].checkpoint_path.exists());

    wait_for_phase(&registry, "pod-a", PodPhase::Stopped).await;
}
