use std::path::PathBuf;

use otpsync_core::icon::{load_icon_file, IconResolver, ImageLoader};
use otpsync_core::proxy::ProxyChannel;
use otpsync_core::util::normalize_url;
use otpsync_core::RegistryStore;

use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    File(PathBuf),
    Auto,
    Remove,
}

impl IconSource {
    pub fn from_flags(file: Option<PathBuf>, auto: bool, remove: bool) -> Result<Self, CliError> {
        match (file, auto, remove) {
            (Some(path), false, false) => Ok(Self::File(path)),
            (None, true, false) => Ok(Self::Auto),
            (None, false, true) => Ok(Self::Remove),
            _ => Err(CliError::Config(
                "exactly one of --file, --auto or --remove is required".to_string(),
            )),
        }
    }
}

pub async fn run_icon_fetch<L: ImageLoader>(
    resolver: &IconResolver<L>,
    url: &str,
) -> Result<(), CliError> {
    let url = normalize_url(url);
    let icon = resolver
        .resolve(&url)
        .await
        .ok_or_else(|| CliError::IconNotFound(url.clone()))?;
    println!("{icon}");
    Ok(())
}

pub async fn run_icon_set<P: ProxyChannel, L: ImageLoader>(
    store: &mut RegistryStore<P>,
    resolver: &IconResolver<L>,
    name: &str,
    source: IconSource,
) -> Result<(), CliError> {
    let entry = store
        .fetch()
        .await?
        .get(name)
        .cloned()
        .ok_or_else(|| CliError::SiteNotFound(name.to_string()))?;

    let icon = match source {
        IconSource::File(path) => Some(load_icon_file(&path)?),
        IconSource::Auto => {
            let url = entry
                .primary_url()
                .ok_or_else(|| CliError::IconNotFound(name.to_string()))?;
            Some(
                resolver
                    .resolve(url)
                    .await
                    .ok_or_else(|| CliError::IconNotFound(url.to_string()))?,
            )
        }
        IconSource::Remove => None,
    };

    let removed = icon.is_none();
    store.set_icon(name, icon).await?;
    if removed {
        println!("{name}: icon removed");
    } else {
        println!("{name}: icon updated");
    }
    Ok(())
}
