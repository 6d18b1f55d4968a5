//! Migration coordinator: single authority for creating, finding, and
//! tearing down migration sessions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use super::session::MigrationSession;
use crate::models::checkpoint::MigrationResult;
use crate::models::pod::Pod;
use crate::registry::PodRegistry;
use crate::{AppError, Result};

/// Kicks off the asynchronous state capture for a pod.
///
/// Invoked fire-and-forget by the coordinator; the implementation is
/// expected to drive the capture on its own task, honoring the contract
/// described on [`CheckpointOptions`](super::session::CheckpointOptions).
pub trait MigrationPreparer: Send + Sync {
    /// Begin capturing `pod` into the session's working directory.
    fn prepare(&self, pod: &Pod, session: Arc<MigrationSession>);
}

/// Process-wide registry mapping a pod UID to at most one in-flight
/// migration session.
///
/// Every request dedicates its calling task to one migration for the
/// whole request-to-response span; the coordinator supports arbitrarily
/// many concurrent migrations for different pods, and rejects a second
/// request for a pod that already has a live session. There is no
/// timeout: a preparer that never reports capture completion parks its
/// requester task indefinitely.
pub struct Coordinator {
    migration_root: PathBuf,
    registry: Arc<dyn PodRegistry>,
    preparer: Arc<dyn MigrationPreparer>,
    sessions: Mutex<HashMap<String, Arc<MigrationSession>>>,
}

impl Coordinator {
    /// Create a coordinator rooting all session paths under
    /// `<checkpoint_root>/migration`.
    #[must_use]
    pub fn new(
        checkpoint_root: &Path,
        registry: Arc<dyn PodRegistry>,
        preparer: Arc<dyn MigrationPreparer>,
    ) -> Self {
        Self {
            migration_root: checkpoint_root.join("migration"),
            registry,
            preparer,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the pod, create its session, and invoke the preparer.
    ///
    /// The returned session is live: the caller is expected to wait on
    /// capture completion and eventually hand the UID to
    /// [`finish_migration`](Self::finish_migration).
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown UID and
    /// `AppError::Conflict` when the pod is not running or already has a
    /// migration in flight.
    pub async fn begin_migration(
        &self,
        pod_uid: &str,
        components: Vec<String>,
    ) -> Result<Arc<MigrationSession>> {
        let pod = self
            .registry
            .lookup_by_uid(pod_uid)
            .ok_or_else(|| AppError::NotFound(format!("no pod with uid {pod_uid}")))?;

        if !pod.is_migratable() {
            return Err(AppError::Conflict(format!(
                "pod {pod_uid} is not running (phase {:?})",
                pod.phase
            )));
        }

        let session = {
            let mut sessions = self
                .sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match sessions.entry(pod_uid.to_owned()) {
                Entry::Occupied(_) => {
                    return Err(AppError::Conflict(format!(
                        "migration already in flight for pod {pod_uid}"
                    )));
                }
                Entry::Vacant(slot) => Arc::clone(slot.insert(Arc::new(MigrationSession::new(
                    pod_uid.to_owned(),
                    self.migration_root.join(pod_uid),
                    components,
                )))),
            }
        };

        session.ensure_path_exists().await;

        info!(
            pod_uid,
            pod_name = %pod.name,
            components = ?session.components(),
            path = %session.path().display(),
            "starting migration"
        );
        self.preparer.prepare(&pod, Arc::clone(&session));

        Ok(session)
    }

    /// Programmatic migration: run the full span on the calling task and
    /// return the assembled result.
    ///
    /// The preparer is released once the result has been assembled for
    /// the caller; receipt of the return value is the commit point on
    /// this path.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`begin_migration`](Self::begin_migration).
    pub async fn trigger_migration(
        &self,
        pod_uid: &str,
        components: Vec<String>,
    ) -> Result<MigrationResult> {
        let session = self.begin_migration(pod_uid, components).await?;
        session.wait_captured().await;
        let result = session.result();
        self.finish_migration(pod_uid);
        Ok(result)
    }

    /// Non-blocking lookup of the live session for a pod. No side effects.
    #[must_use]
    pub fn find_migration(&self, pod_uid: &str) -> Option<Arc<MigrationSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pod_uid)
            .map(Arc::clone)
    }

    /// Single teardown path: remove the session from the registry and
    /// release its preparer.
    ///
    /// Must be called exactly once per session, after the result has been
    /// committed to the requester. Calling it for a pod without a live
    /// session logs and does nothing.
    pub fn finish_migration(&self, pod_uid: &str) {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(pod_uid);

        let Some(session) = removed else {
            warn!(pod_uid, "no live migration session to finish");
            return;
        };

        if let Err(err) = session.handshake().release() {
            // Invariant violation: the teardown path owns the release.
            warn!(pod_uid, %err, "released signal fired twice");
        }
        info!(pod_uid, "migration finished, session removed");
    }
}
