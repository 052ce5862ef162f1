//! Registry import/export as a portable JSON document.
//!
//! The document is an object keyed by site name (in registry order) whose
//! values are `{secret, urls, icon}`. It carries no schema version or checksum.

use crate::models::Registry;
use crate::proxy::ProxyChannel;
use crate::store::RegistryStore;
use crate::{Error, Result};

/// File name offered for downloaded exports.
pub const EXPORT_FILE_NAME: &str = "totp_config.json";

/// Render a registry as a pretty-printed document.
pub fn render_document(registry: &Registry) -> Result<String> {
    Ok(serde_json::to_string_pretty(registry)?)
}

/// Parse and validate a document without touching the remote.
pub fn parse_document(document: &str) -> Result<Registry> {
    let value = serde_json::from_str::<serde_json::Value>(document)
        .map_err(|error| Error::validation(format!("document is not valid JSON: {error}")))?;
    if !value.is_object() {
        return Err(Error::validation("document must be a JSON object"));
    }

    // Parse the text again rather than the `Value` so key order is kept.
    let registry = serde_json::from_str::<Registry>(document)
        .map_err(|error| Error::validation(format!("document has malformed entries: {error}")))?;
    let invalid = registry.invalid_entries();
    if !invalid.is_empty() {
        return Err(Error::validation(format!(
            "entries without a secret: {}",
            invalid.join(", ")
        )));
    }
    Ok(registry)
}

/// Moves whole registries between the remote and portable documents.
#[derive(Debug)]
pub struct ImportExportBridge<'a, P> {
    store: &'a mut RegistryStore<P>,
}

impl<'a, P: ProxyChannel> ImportExportBridge<'a, P> {
    pub fn new(store: &'a mut RegistryStore<P>) -> Self {
        Self { store }
    }

    /// Fetch the current remote registry and render it. Never falls back to
    /// the local mirror.
    pub async fn export(&mut self) -> Result<String> {
        let registry = self.store.fetch().await?;
        let document = render_document(registry)?;
        tracing::info!("Exported {} sites", registry.len());
        Ok(document)
    }

    /// Replace the remote registry with the document's contents.
    ///
    /// Destructive: existing entries missing from the document are deleted.
    /// Returns the registry held after re-fetching the remote.
    pub async fn import(&mut self, document: &str) -> Result<Registry> {
        let registry = parse_document(document)?;
        let count = registry.len();
        self.store.commit(registry).await?;
        tracing::info!("Imported {} sites", count);
        self.store.refresh_after_commit().await;
        Ok(self.store.mirror().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteEntry;
    use crate::proxy::InMemoryProxy;
    use pretty_assertions::assert_eq;

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry.insert(
            "zeta",
            SiteEntry::new("Z1", ["zeta.io", "http://alt.zeta.io"], None),
        );
        registry.insert(
            "alpha",
            SiteEntry::new(
                "A1",
                Vec::<String>::new(),
                Some("data:image/png;base64,AAAA".to_string()),
            ),
        );
        registry
    }

    #[tokio::test(flavor = "current_thread")]
    async fn import_of_export_reproduces_registry() {
        let remote = InMemoryProxy::new(sample_registry());
        let mut store = RegistryStore::new(&remote);

        let document = ImportExportBridge::new(&mut store).export().await.unwrap();
        remote
            .update_config(&Registry::new())
            .await
            .unwrap();

        let imported = ImportExportBridge::new(&mut store)
            .import(&document)
            .await
            .unwrap();
        assert_eq!(imported, sample_registry());
        assert_eq!(remote.snapshot(), sample_registry());
        assert_eq!(
            remote.snapshot().names().collect::<Vec<_>>(),
            vec!["zeta", "alpha"]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn export_fails_instead_of_using_stale_mirror() {
        let remote = InMemoryProxy::new(sample_registry());
        let mut store = RegistryStore::new(&remote);
        store.fetch().await.unwrap();
        remote.set_failure(Some("not configured"));

        let error = ImportExportBridge::new(&mut store).export().await.unwrap_err();
        assert!(matches!(error, Error::Proxy(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn import_overwrites_instead_of_merging() {
        let remote = InMemoryProxy::new(sample_registry());
        let mut store = RegistryStore::new(&remote);

        ImportExportBridge::new(&mut store)
            .import(r#"{"only":{"secret":"O1","urls":[],"icon":null}}"#)
            .await
            .unwrap();

        let remote_names = remote.snapshot();
        assert_eq!(remote_names.names().collect::<Vec<_>>(), vec!["only"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn import_refreshes_mirror_from_remote() {
        let remote = InMemoryProxy::new(sample_registry());
        let mut store = RegistryStore::new(&remote);
        store.fetch().await.unwrap();

        let imported = ImportExportBridge::new(&mut store)
            .import(r#"{"only":{"secret":"O1","urls":["only.io"]}}"#)
            .await
            .unwrap();

        assert_eq!(store.mirror(), &remote.snapshot());
        assert_eq!(imported, remote.snapshot());
        assert_eq!(store.mirror().names().collect::<Vec<_>>(), vec!["only"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn import_succeeds_when_refresh_fails() {
        let remote = InMemoryProxy::new(sample_registry());
        remote.fail_fetches_after(0, "connection reset");
        let mut store = RegistryStore::new(&remote);

        let imported = ImportExportBridge::new(&mut store)
            .import(r#"{"only":{"secret":"O1"}}"#)
            .await
            .unwrap();

        assert_eq!(imported.names().collect::<Vec<_>>(), vec!["only"]);
        assert_eq!(remote.snapshot(), imported);
        assert_eq!(remote.commit_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn import_rejects_non_object_documents() {
        let remote = InMemoryProxy::new(sample_registry());
        let mut store = RegistryStore::new(&remote);

        for document in ["[1,2,3]", "\"text\"", "42", "{not json"] {
            let error = ImportExportBridge::new(&mut store)
                .import(document)
                .await
                .unwrap_err();
            assert!(matches!(error, Error::Validation(_)), "{document}");
        }
        assert_eq!(remote.commit_count(), 0);
        assert_eq!(remote.snapshot(), sample_registry());
    }

    #[test]
    fn parse_document_rejects_entries_without_secret() {
        let error = parse_document(r#"{"a":{"secret":"A"},"b":{"urls":[]}}"#).unwrap_err();
        match error {
            Error::Validation(message) => assert!(message.contains('b')),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn render_document_is_pretty_and_ordered() {
        let rendered = render_document(&sample_registry()).unwrap();
        assert!(rendered.starts_with("{\n  \"zeta\""));
        assert!(rendered.contains("\"icon\": null"));
    }
}
