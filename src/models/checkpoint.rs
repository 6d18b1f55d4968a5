//! Checkpoint result types produced by a completed migration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location of one component's checkpoint artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ComponentCheckpoint {
    /// Path of the artifact beneath the migration working directory.
    pub checkpoint_path: PathBuf,
}

/// Outcome of a migration, reported once to the original requester.
///
/// `components` maps every requested component name to its artifact at
/// `<path>/<component>` — exactly the requested set, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct MigrationResult {
    /// Working directory containing all checkpoint artifacts.
    pub path: PathBuf,
    /// Per-component artifact locations.
    pub components: BTreeMap<String, ComponentCheckpoint>,
}

impl MigrationResult {
    /// Assemble the result for a working directory and component list.
    #[must_use]
    pub fn new(path: &Path, components: &[String]) -> Self {
        let components = components
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    ComponentCheckpoint {
                        checkpoint_path: path.join(name),
                    },
                )
            })
            .collect();
        Self {
            path: path.to_path_buf(),
            components,
        }
    }
}

/// Manifest written into each component's checkpoint artifact by the
/// built-in local checkpointer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CheckpointManifest {
    /// Owning pod identifier.
    pub pod_uid: String,
    /// Component the artifact belongs to.
    pub component: String,
    /// Capture timestamp.
    pub captured_at: DateTime<Utc>,
}
