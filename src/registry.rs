//! Pod registry boundary.
//!
//! The coordinator only needs to resolve an identifier to a live pod; how
//! pods come to be known (static manifests, a node agent, an API watcher)
//! is the embedder's concern behind [`PodRegistry`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::models::pod::{Pod, PodPhase};

/// Resolves pod identifiers to live pods.
pub trait PodRegistry: Send + Sync {
    /// Look up a pod by its UID. No side effects.
    fn lookup_by_uid(&self, uid: &str) -> Option<Pod>;
}

/// Process-local registry backing the standalone daemon and the tests.
#[derive(Debug, Default)]
pub struct InMemoryPodRegistry {
    pods: Mutex<HashMap<String, Pod>>,
}

impl InMemoryPodRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the given pods.
    #[must_use]
    pub fn with_pods(pods: Vec<Pod>) -> Self {
        let registry = Self::new();
        for pod in pods {
            registry.insert(pod);
        }
        registry
    }

    /// Register a pod, replacing any previous entry with the same UID.
    pub fn insert(&self, pod: Pod) {
        self.pods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pod.uid.clone(), pod);
    }

    /// Update a pod's run-state. Returns false if the pod is unknown.
    pub fn set_phase(&self, uid: &str, phase: PodPhase) -> bool {
        match self
            .pods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(uid)
        {
            Some(pod) => {
                pod.phase = phase;
                true
            }
            None => false,
        }
    }
}

impl PodRegistry for InMemoryPodRegistry {
    fn lookup_by_uid(&self, uid: &str) -> Option<Pod> {
        self.pods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid)
            .cloned()
    }
}
