//! Proxy backed by an in-process registry.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{ConnectionConfig, Registry};
use crate::{Error, Result};

use super::ProxyChannel;

/// A remote registry held in memory.
///
/// Stands in for the background proxy in tests and offline embeddings. A
/// failure message can be injected to make every action fail the way an
/// unreachable or misconfigured proxy would.
#[derive(Debug, Default)]
pub struct InMemoryProxy {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    registry: Registry,
    config: Option<ConnectionConfig>,
    failure: Option<String>,
    fetch_limit: Option<(usize, String)>,
    commits: usize,
}

impl InMemoryProxy {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                registry,
                ..MemoryState::default()
            }),
        }
    }

    /// Make every subsequent action fail with `message` (or succeed again with `None`).
    pub fn set_failure(&self, message: Option<&str>) {
        self.lock().failure = message.map(ToString::to_string);
    }

    /// Let `successes` more `fetchConfig` calls through, then fail the rest
    /// with `message`. Other actions are unaffected.
    pub fn fail_fetches_after(&self, successes: usize, message: &str) {
        self.lock().fetch_limit = Some((successes, message.to_string()));
    }

    /// Current remote registry.
    pub fn snapshot(&self) -> Registry {
        self.lock().registry.clone()
    }

    /// Number of successful `updateConfig` calls.
    pub fn commit_count(&self) -> usize {
        self.lock().commits
    }

    /// Connection settings last handed over through `saveApiConfig`/`resetApiConfig`.
    pub fn connection(&self) -> Option<ConnectionConfig> {
        self.lock().config.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn checked(&self) -> Result<MutexGuard<'_, MemoryState>> {
        let state = self.lock();
        match &state.failure {
            Some(message) => Err(Error::Proxy(message.clone())),
            None => Ok(state),
        }
    }
}

impl ProxyChannel for InMemoryProxy {
    async fn fetch_config(&self) -> Result<Registry> {
        let mut state = self.checked()?;
        match &mut state.fetch_limit {
            Some((0, message)) => return Err(Error::Proxy(message.clone())),
            Some((remaining, _)) => *remaining -= 1,
            None => {}
        }
        Ok(state.registry.clone())
    }

    async fn update_config(&self, registry: &Registry) -> Result<()> {
        let mut state = self.checked()?;
        state.registry = registry.clone();
        state.commits += 1;
        Ok(())
    }

    async fn fetch_codes(&self) -> Result<Vec<String>> {
        let state = self.checked()?;
        Ok(state.registry.names().map(ToString::to_string).collect())
    }

    async fn save_api_config(&self, config: &ConnectionConfig) -> Result<()> {
        self.lock().config = Some(config.clone());
        Ok(())
    }

    async fn reset_api_config(&self, config: &ConnectionConfig) -> Result<()> {
        let mut state = self.checked()?;
        state.config = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteEntry;

    #[tokio::test(flavor = "current_thread")]
    async fn update_replaces_registry_wholesale() {
        let mut initial = Registry::new();
        initial.insert("github", SiteEntry::new("S1", ["github.com"], None));
        let proxy = InMemoryProxy::new(initial);

        let mut replacement = Registry::new();
        replacement.insert("gitlab", SiteEntry::new("S2", ["gitlab.com"], None));
        proxy.update_config(&replacement).await.unwrap();

        assert_eq!(proxy.fetch_config().await.unwrap(), replacement);
        assert_eq!(proxy.commit_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn injected_failure_surfaces_as_proxy_error() {
        let proxy = InMemoryProxy::default();
        proxy.set_failure(Some("API令牌错误!"));

        let error = proxy.fetch_config().await.unwrap_err();
        assert!(matches!(error, Error::Proxy(message) if message == "API令牌错误!"));
        assert!(proxy.update_config(&Registry::new()).await.is_err());
        assert_eq!(proxy.commit_count(), 0);

        proxy.set_failure(None);
        assert!(proxy.fetch_config().await.is_ok());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetch_limit_only_affects_fetches() {
        let proxy = InMemoryProxy::default();
        proxy.fail_fetches_after(1, "timed out");

        assert!(proxy.fetch_config().await.is_ok());
        assert!(matches!(
            proxy.fetch_config().await,
            Err(Error::Proxy(message)) if message == "timed out"
        ));
        proxy.update_config(&Registry::new()).await.unwrap();
        assert_eq!(proxy.commit_count(), 1);
    }
}
