//! A single in-flight migration and the capability handed to its preparer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::handshake::{Handshake, MigrationPhase};
use crate::models::checkpoint::MigrationResult;

/// Immutable capture descriptor handed to the preparer.
///
/// The preparer is expected to write one artifact per component beneath
/// `checkpoint_dir`, call [`Handshake::complete`], then wait on
/// [`Handshake::wait_released`] before finalizing the pod.
#[derive(Debug, Clone)]
pub struct CheckpointOptions {
    /// Directory all checkpoint artifacts are written beneath.
    pub checkpoint_dir: PathBuf,
    /// Whether the pod should keep running after capture. Always false:
    /// migration implies pause.
    pub keep_running: bool,
    /// Components to checkpoint, as requested by the caller.
    pub components: Vec<String>,
    /// Rendezvous signals shared with the requester.
    pub handshake: Arc<Handshake>,
}

/// Rendezvous object for one migration.
///
/// A session is meaningful only while registered with the coordinator;
/// once removed it must not be reused.
#[derive(Debug)]
pub struct MigrationSession {
    pod_uid: String,
    path: PathBuf,
    components: Vec<String>,
    handshake: Arc<Handshake>,
    started_at: DateTime<Utc>,
}

impl MigrationSession {
    /// Create a session rooted at `path` for the given components.
    #[must_use]
    pub fn new(pod_uid: String, path: PathBuf, components: Vec<String>) -> Self {
        Self {
            pod_uid,
            path,
            components,
            handshake: Arc::new(Handshake::new()),
            started_at: Utc::now(),
        }
    }

    /// Pod this session belongs to.
    #[must_use]
    pub fn pod_uid(&self) -> &str {
        &self.pod_uid
    }

    /// Working directory containing all checkpoint artifacts.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Components being checkpointed.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// When the session was created.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Rendezvous signals for this migration.
    #[must_use]
    pub fn handshake(&self) -> &Arc<Handshake> {
        &self.handshake
    }

    /// Current handshake phase.
    #[must_use]
    pub fn phase(&self) -> MigrationPhase {
        self.handshake.phase()
    }

    /// Capture descriptor for the preparer.
    #[must_use]
    pub fn options(&self) -> CheckpointOptions {
        CheckpointOptions {
            checkpoint_dir: self.path.clone(),
            keep_running: false,
            components: self.components.clone(),
            handshake: Arc::clone(&self.handshake),
        }
    }

    /// Create the working directory, best-effort.
    ///
    /// A failure is logged and swallowed: the preparer may still succeed
    /// or fail on its own, and it owns the final verdict on capture.
    pub async fn ensure_path_exists(&self) {
        if let Err(err) = tokio::fs::create_dir_all(&self.path).await {
            warn!(
                pod_uid = %self.pod_uid,
                path = %self.path.display(),
                %err,
                "failed to create checkpoint dir"
            );
        }
    }

    /// Block until the preparer has reported capture completion.
    pub async fn wait_captured(&self) {
        self.handshake.wait_captured().await;
    }

    /// Block until the migration has been released.
    ///
    /// For external collaborators that must not act on the pod before the
    /// requester has received the checkpoint location.
    pub async fn wait_until_finished(&self) {
        self.handshake.wait_released().await;
    }

    /// Assemble the result reported to the requester: the working
    /// directory plus `<path>/<component>` for every requested component.
    #[must_use]
    pub fn result(&self) -> MigrationResult {
        MigrationResult::new(&self.path, &self.components)
    }
}
