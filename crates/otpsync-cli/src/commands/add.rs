use std::path::Path;

use otpsync_core::icon::{load_icon_file, IconResolver, ImageLoader};
use otpsync_core::proxy::ProxyChannel;
use otpsync_core::{RegistryStore, SiteDraft, UpsertOutcome};

use crate::error::CliError;

pub struct AddRequest<'a> {
    pub name: &'a str,
    pub secret: &'a str,
    pub urls: &'a [String],
    pub icon_file: Option<&'a Path>,
    pub auto_icon: bool,
}

pub async fn run_add<P: ProxyChannel, L: ImageLoader>(
    store: &mut RegistryStore<P>,
    resolver: &IconResolver<L>,
    request: AddRequest<'_>,
) -> Result<(), CliError> {
    let outcome = add_site(store, resolver, request).await?;
    println!("{}", outcome.verb());
    Ok(())
}

pub async fn add_site<P: ProxyChannel, L: ImageLoader>(
    store: &mut RegistryStore<P>,
    resolver: &IconResolver<L>,
    request: AddRequest<'_>,
) -> Result<UpsertOutcome, CliError> {
    let mut draft = SiteDraft {
        name: request.name.to_string(),
        secret: request.secret.to_string(),
        urls_text: request.urls.join("\n"),
        icon: None,
    };

    if let Some(path) = request.icon_file {
        draft.icon = Some(load_icon_file(path)?);
    } else if request.auto_icon {
        let current = store
            .fetch()
            .await?
            .get(draft.name.trim())
            .and_then(|entry| entry.icon.clone());
        if current.is_none() {
            draft.icon = resolver.resolve_missing(None, &draft.urls()).await;
        }
    }

    Ok(store.upsert_site(draft).await?)
}
