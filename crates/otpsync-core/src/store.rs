//! Local mirror of the remote registry and the only path for remote writes.
//!
//! Every mutation is a full overwrite: the caller holds (or fetches) the whole
//! registry, changes it locally and commits the complete result. There is no
//! version check on commit, so two clients committing concurrently silently
//! clobber each other's unseen changes. Fetch immediately before editing to
//! keep that window small.

use crate::models::{Registry, SiteDraft};
use crate::proxy::ProxyChannel;
use crate::{Error, Result};

/// Whether an upsert created a new entry or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

impl UpsertOutcome {
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
        }
    }
}

/// Owns the in-memory mirror of `{site name -> entry}`.
#[derive(Debug)]
pub struct RegistryStore<P> {
    proxy: P,
    mirror: Registry,
}

impl<P: ProxyChannel> RegistryStore<P> {
    /// Create a store with an empty mirror; call [`Self::fetch`] to populate it.
    pub const fn new(proxy: P) -> Self {
        Self {
            proxy,
            mirror: Registry::new(),
        }
    }

    pub const fn proxy(&self) -> &P {
        &self.proxy
    }

    /// Last registry seen from or written to the remote. May be stale after a
    /// failed commit.
    pub const fn mirror(&self) -> &Registry {
        &self.mirror
    }

    /// Fetch the full remote registry and replace the mirror unconditionally.
    pub async fn fetch(&mut self) -> Result<&Registry> {
        let registry = self.proxy.fetch_config().await.inspect_err(|error| {
            tracing::warn!("Failed to fetch registry: {}", error);
        })?;
        tracing::info!("Fetched registry with {} sites", registry.len());
        self.mirror = registry;
        Ok(&self.mirror)
    }

    /// Replace the entire remote registry with `registry`.
    ///
    /// Keys absent from `registry` are deleted remotely. On failure the mirror
    /// is left as it was.
    pub async fn commit(&mut self, registry: Registry) -> Result<()> {
        if let Some(name) = registry.invalid_entries().first() {
            return Err(Error::validation(format!(
                "site '{name}' has an empty secret"
            )));
        }

        self.proxy
            .update_config(&registry)
            .await
            .inspect_err(|error| tracing::warn!("Failed to commit registry: {}", error))?;
        tracing::info!("Committed registry with {} sites", registry.len());
        self.mirror = registry;
        Ok(())
    }

    /// Re-anchor the mirror on the remote after a successful commit.
    ///
    /// The write already landed, so a failed fetch only leaves the committed
    /// registry as the mirror and is logged rather than returned.
    pub(crate) async fn refresh_after_commit(&mut self) {
        if let Err(error) = self.fetch().await {
            tracing::warn!("Registry committed but refresh failed: {}", error);
        }
    }

    /// Add or replace one site, then re-anchor the mirror on the remote.
    ///
    /// The current remote registry is fetched first. An update without a new
    /// icon keeps the previous one; new sites are appended at the end.
    pub async fn upsert_site(&mut self, draft: SiteDraft) -> Result<UpsertOutcome> {
        let (name, mut entry) = draft.into_entry()?;

        let mut registry = self.fetch().await?.clone();
        let outcome = match registry.get(&name) {
            Some(existing) => {
                if entry.icon.is_none() {
                    entry.icon.clone_from(&existing.icon);
                }
                UpsertOutcome::Updated
            }
            None => UpsertOutcome::Added,
        };

        registry.insert(name.clone(), entry);
        self.commit(registry).await?;
        tracing::info!("Site {} {}", name, outcome.verb());
        self.refresh_after_commit().await;
        Ok(outcome)
    }

    /// Remove one site from the held mirror and commit the rest.
    pub async fn delete_site(&mut self, name: &str) -> Result<()> {
        let mut registry = self.mirror.clone();
        if registry.remove(name).is_none() {
            return Err(Error::validation(format!("site '{name}' does not exist")));
        }

        self.commit(registry).await?;
        tracing::info!("Site {} deleted", name);
        self.refresh_after_commit().await;
        Ok(())
    }

    /// Replace (or clear) the icon of one held site.
    pub async fn set_icon(&mut self, name: &str, icon: Option<String>) -> Result<()> {
        let mut registry = self.mirror.clone();
        let entry = registry
            .get_mut(name)
            .ok_or_else(|| Error::validation(format!("site '{name}' does not exist")))?;
        entry.icon = icon;

        self.commit(registry).await?;
        self.refresh_after_commit().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteEntry;
    use crate::proxy::InMemoryProxy;
    use pretty_assertions::assert_eq;

    fn github_registry() -> Registry {
        let mut registry = Registry::new();
        registry.insert("github", SiteEntry::new("S1", ["github.com"], None));
        registry
    }

    fn draft(name: &str, secret: &str, urls: &str) -> SiteDraft {
        SiteDraft {
            name: name.to_string(),
            secret: secret.to_string(),
            urls_text: urls.to_string(),
            icon: None,
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetch_replaces_mirror() {
        let remote = InMemoryProxy::new(github_registry());
        let mut store = RegistryStore::new(&remote);
        assert!(store.mirror().is_empty());

        store.fetch().await.unwrap();
        assert_eq!(store.mirror(), &github_registry());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn commit_missing_key_deletes_it_remotely() {
        let remote = InMemoryProxy::new(github_registry());
        let mut store = RegistryStore::new(&remote);
        store.fetch().await.unwrap();

        let mut replacement = Registry::new();
        replacement.insert("gitlab", SiteEntry::new("S2", ["gitlab.com"], None));
        store.commit(replacement.clone()).await.unwrap();

        let fetched = store.fetch().await.unwrap();
        assert!(!fetched.contains("github"));
        assert_eq!(fetched, &replacement);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_commit_leaves_mirror_stale() {
        let remote = InMemoryProxy::new(github_registry());
        let mut store = RegistryStore::new(&remote);
        store.fetch().await.unwrap();

        remote.set_failure(Some("proxy unavailable"));
        let error = store.commit(Registry::new()).await.unwrap_err();
        assert!(matches!(error, Error::Proxy(_)));
        assert_eq!(store.mirror(), &github_registry());
        assert_eq!(remote.commit_count(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn commit_rejects_entries_without_secret() {
        let remote = InMemoryProxy::default();
        let mut store = RegistryStore::new(&remote);
        let mut registry = Registry::new();
        registry.insert("broken", SiteEntry::default());

        assert!(matches!(
            store.commit(registry).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(remote.commit_count(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn adding_site_leaves_existing_entry_untouched() {
        let remote = InMemoryProxy::new(github_registry());
        let mut store = RegistryStore::new(&remote);

        let outcome = store
            .upsert_site(draft("gitlab", "S2", "gitlab.com"))
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Added);
        let committed = remote.snapshot();
        assert_eq!(committed.names().collect::<Vec<_>>(), vec!["github", "gitlab"]);
        assert_eq!(committed.get("github"), github_registry().get("github"));
        assert_eq!(
            serde_json::to_string(committed.get("github").unwrap()).unwrap(),
            r#"{"secret":"S1","urls":["https://github.com"],"icon":null}"#
        );
        assert_eq!(
            committed.get("gitlab"),
            Some(&SiteEntry::new("S2", ["https://gitlab.com"], None))
        );
        assert_eq!(store.mirror(), &committed);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn update_keeps_previous_icon_and_position() {
        let mut initial = github_registry();
        initial.insert(
            "gitlab",
            SiteEntry::new("S2", ["gitlab.com"], Some("data:image/png;base64,OLD".to_string())),
        );
        initial.insert("gitea", SiteEntry::new("S3", ["gitea.io"], None));
        let remote = InMemoryProxy::new(initial);
        let mut store = RegistryStore::new(&remote);

        let outcome = store
            .upsert_site(draft("gitlab", "S 2 b", "gitlab.example.com"))
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        let committed = remote.snapshot();
        let gitlab = committed.get("gitlab").unwrap();
        assert_eq!(gitlab.secret, "S2b");
        assert_eq!(gitlab.icon.as_deref(), Some("data:image/png;base64,OLD"));
        assert_eq!(committed.position("gitlab"), Some(1));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn upsert_surfaces_fetch_failure_without_committing() {
        let remote = InMemoryProxy::new(github_registry());
        remote.set_failure(Some("extension context invalidated"));
        let mut store = RegistryStore::new(&remote);

        let error = store
            .upsert_site(draft("gitlab", "S2", ""))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Proxy(_)));
        assert_eq!(remote.commit_count(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_requires_known_site() {
        let remote = InMemoryProxy::new(github_registry());
        let mut store = RegistryStore::new(&remote);
        store.fetch().await.unwrap();

        assert!(matches!(
            store.delete_site("gitlab").await,
            Err(Error::Validation(_))
        ));

        store.delete_site("github").await.unwrap();
        assert!(remote.snapshot().is_empty());
        assert!(store.mirror().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn set_icon_replaces_and_clears() {
        let remote = InMemoryProxy::new(github_registry());
        let mut store = RegistryStore::new(&remote);
        store.fetch().await.unwrap();

        store
            .set_icon("github", Some("data:image/png;base64,NEW".to_string()))
            .await
            .unwrap();
        assert_eq!(
            remote.snapshot().get("github").unwrap().icon.as_deref(),
            Some("data:image/png;base64,NEW")
        );

        store.set_icon("github", None).await.unwrap();
        assert_eq!(remote.snapshot().get("github").unwrap().icon, None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn refresh_failure_after_commit_still_reports_success() {
        let remote = InMemoryProxy::new(github_registry());
        remote.fail_fetches_after(1, "connection reset");
        let mut store = RegistryStore::new(&remote);

        let outcome = store
            .upsert_site(draft("gitlab", "S2", "gitlab.com"))
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Added);
        assert_eq!(remote.commit_count(), 1);
        assert!(remote.snapshot().contains("gitlab"));
        assert_eq!(store.mirror(), &remote.snapshot());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_and_icon_survive_failed_refresh() {
        let remote = InMemoryProxy::new(github_registry());
        let mut store = RegistryStore::new(&remote);
        store.fetch().await.unwrap();
        remote.fail_fetches_after(0, "connection reset");

        store
            .set_icon("github", Some("data:image/png;base64,NEW".to_string()))
            .await
            .unwrap();
        assert_eq!(
            store.mirror().get("github").unwrap().icon.as_deref(),
            Some("data:image/png;base64,NEW")
        );

        store.delete_site("github").await.unwrap();
        assert!(remote.snapshot().is_empty());
        assert!(store.mirror().is_empty());
        assert_eq!(remote.commit_count(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_clients_last_commit_wins() {
        let remote = InMemoryProxy::new(github_registry());
        let mut first = RegistryStore::new(&remote);
        let mut second = RegistryStore::new(&remote);
        first.fetch().await.unwrap();
        second.fetch().await.unwrap();

        first
            .upsert_site(draft("gitlab", "S2", "gitlab.com"))
            .await
            .unwrap();
        // `second` still holds the stale mirror without gitlab.
        second.delete_site("github").await.unwrap();

        assert!(remote.snapshot().is_empty());
    }
}
