use std::path::Path;

use otpsync_core::icon::load_icon_file;
use otpsync_core::proxy::ProxyChannel;
use otpsync_core::{RegistryStore, SiteDraft};

use crate::error::CliError;

pub async fn run_edit<P: ProxyChannel>(
    store: &mut RegistryStore<P>,
    name: &str,
    secret: Option<&str>,
    urls: &[String],
    icon_file: Option<&Path>,
) -> Result<(), CliError> {
    let existing = store
        .fetch()
        .await?
        .get(name)
        .cloned()
        .ok_or_else(|| CliError::SiteNotFound(name.to_string()))?;

    let mut draft = SiteDraft::from_entry(name, &existing);
    if let Some(secret) = secret {
        draft.secret = secret.to_string();
    }
    if !urls.is_empty() {
        draft.urls_text = urls.join("\n");
    }
    if let Some(path) = icon_file {
        draft.icon = Some(load_icon_file(path)?);
    }

    let outcome = store.upsert_site(draft).await?;
    println!("{}", outcome.verb());
    Ok(())
}
