//! Pod domain model.

use serde::{Deserialize, Serialize};

/// Run-state of a pod as tracked by the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PodPhase {
    /// Pod accepted but its containers are not all up yet.
    Pending,
    /// All containers running; the only phase a migration may start from.
    Running,
    /// Pod paused and checkpointed by a completed migration.
    Stopped,
    /// Pod exited abnormally.
    Failed,
}

/// A locally-managed pod as seen by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Pod {
    /// Unique pod identifier; keys the session registry.
    pub uid: String,
    /// Human-readable pod name, used in logs only.
    pub name: String,
    /// Current run-state.
    pub phase: PodPhase,
    /// Names of the containers the pod is composed of.
    pub containers: Vec<String>,
}

impl Pod {
    /// Construct a running pod with the given containers.
    #[must_use]
    pub fn running(uid: impl Into<String>, name: impl Into<String>, containers: Vec<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            phase: PodPhase::Running,
            containers,
        }
    }

    /// Whether a migration may start for this pod.
    #[must_use]
    pub fn is_migratable(&self) -> bool {
        self.phase == PodPhase::Running
    }
}
