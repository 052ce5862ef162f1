//! Connection settings model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::normalize_url;
use crate::{Error, Result};

/// Credentials the background proxy uses to reach the remote registry.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ConnectionConfig {
    /// Build validated settings from raw user input.
    ///
    /// The base URL gets a scheme if it has none and loses any trailing `/`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let base_url = normalize_url(base_url);
        if base_url.is_empty() {
            return Err(Error::validation("server address is required"));
        }
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::validation("API key is required"));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
