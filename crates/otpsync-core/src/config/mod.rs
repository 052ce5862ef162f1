//! Locally persisted connection state.
//!
//! Holds the settings the background proxy needs to reach the remote
//! registry, plus a flag recording whether the last connection test passed.
//! The registry itself is never stored here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::ConnectionConfig;
use crate::Result;

/// File name used under the platform config directory.
pub const LOCAL_STATE_FILE_NAME: &str = "local-state.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    #[serde(default)]
    pub api_config: Option<ConnectionConfig>,
    #[serde(default)]
    pub connection_tested: bool,
}

impl LocalState {
    /// Load state from `path`, returning defaults when the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let mut state = serde_json::from_str::<Self>(&raw)?;
        state.normalize();
        Ok(state)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        tracing::debug!("Saved local state to {}", path.display());
        Ok(())
    }

    /// Remove all persisted state, including the connection-tested flag.
    pub fn clear_at_path(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    /// Connection settings, if both fields are present.
    pub fn connection(&self) -> Option<&ConnectionConfig> {
        self.api_config
            .as_ref()
            .filter(|config| config.is_complete())
    }

    fn normalize(&mut self) {
        if let Some(config) = self.api_config.as_mut() {
            config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
            config.api_key = config.api_key.trim().to_string();
        }
        if self.connection().is_none() {
            self.connection_tested = false;
        }
    }
}
