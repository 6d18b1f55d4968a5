//! Built-in preparer for standalone operation.
//!
//! Writes one checkpoint manifest per requested component beneath the
//! session's working directory, reports capture completion, and once
//! released finalizes the pod by marking it stopped. The real capture
//! engine (CRIU or a runtime shim) plugs in behind the same
//! [`MigrationPreparer`] seam.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::migration::{MigrationPreparer, MigrationSession};
use crate::models::checkpoint::CheckpointManifest;
use crate::models::pod::{Pod, PodPhase};
use crate::registry::InMemoryPodRegistry;

/// Preparer that captures pod state into local manifest files.
pub struct LocalCheckpointer {
    registry: Arc<InMemoryPodRegistry>,
}

impl LocalCheckpointer {
    /// Create a checkpointer that finalizes pods in the given registry.
    #[must_use]
    pub fn new(registry: Arc<InMemoryPodRegistry>) -> Self {
        Self { registry }
    }
}

impl MigrationPreparer for LocalCheckpointer {
    fn prepare(&self, pod: &Pod, session: Arc<MigrationSession>) {
        let registry = Arc::clone(&self.registry);
        let pod = pod.clone();

        tokio::spawn(async move {
            let opts = session.options();

            for component in &opts.components {
                let manifest = CheckpointManifest {
                    pod_uid: pod.uid.clone(),
                    component: component.clone(),
                    captured_at: Utc::now(),
                };
                let artifact = opts.checkpoint_dir.join(component);
                match serde_json::to_vec_pretty(&manifest) {
                    Ok(bytes) => {
                        if let Err(err) = tokio::fs::write(&artifact, bytes).await {
                            warn!(
                                pod_uid = %pod.uid,
                                %component,
                                artifact = %artifact.display(),
                                %err,
                                "failed to write checkpoint artifact"
                            );
                        }
                    }
                    Err(err) => {
                        warn!(pod_uid = %pod.uid, %component, %err, "failed to encode checkpoint manifest");
                    }
                }
            }

            // Capture completion must be reported even after artifact
            // failures: the requester is parked on this signal.
            if let Err(err) = opts.handshake.complete() {
                warn!(pod_uid = %pod.uid, %err, "capture completion already reported");
            }

            opts.handshake.wait_released().await;

            if !opts.keep_running {
                if registry.set_phase(&pod.uid, PodPhase::Stopped) {
                    info!(pod_uid = %pod.uid, pod_name = %pod.name, "pod stopped after migration");
                } else {
                    warn!(pod_uid = %pod.uid, "pod vanished from registry before finalize");
                }
            }
        });
    }
}
