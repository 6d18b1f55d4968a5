//! Global configuration parsing and validation.

use std::collections::HashSet;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::pod::Pod;
use crate::{AppError, Result};

fn default_http_port() -> u16 {
    8750
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Root directory all migration working directories nest under.
    pub checkpoint_root: PathBuf,
    /// TCP port for the migration API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Interface the migration API binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// Pods registered at startup for standalone operation.
    #[serde(default)]
    pub static_pods: Vec<Pod>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Socket address the migration API listens on.
    #[must_use]
    pub fn bind(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }

    fn validate(&self) -> Result<()> {
        if self.checkpoint_root.as_os_str().is_empty() {
            return Err(AppError::Config("checkpoint_root must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for pod in &self.static_pods {
            if pod.uid.is_empty() {
                return Err(AppError::Config("static pod uid must not be empty".into()));
            }
            if !seen.insert(pod.uid.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate static pod uid: {}",
                    pod.uid
                )));
            }
        }

        Ok(())
    }
}
