use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use otpsync_core::config::{LocalState, LOCAL_STATE_FILE_NAME};
use otpsync_core::icon::{HttpImageLoader, IconResolver};
use otpsync_core::proxy::HttpProxy;
use otpsync_core::reorder::{sorted_view, SortOrder};
use otpsync_core::util::mask_secret;
use otpsync_core::{Registry, RegistryStore, SiteEntry};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct SiteListItem {
    pub position: usize,
    pub name: String,
    pub secret: String,
    pub urls: Vec<String>,
    pub has_icon: bool,
}

pub fn default_state_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("otpsync").join(LOCAL_STATE_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

pub fn resolve_state_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match explicit {
        Some(path) => Ok(path),
        None => default_state_path(),
    }
}

pub fn load_state(state_path: &Path) -> Result<LocalState, CliError> {
    Ok(LocalState::load_from_path(state_path)?)
}

/// Store over the HTTP proxy using the persisted connection settings.
pub fn open_store(state_path: &Path) -> Result<RegistryStore<HttpProxy>, CliError> {
    let state = load_state(state_path)?;
    let config = state.connection().cloned().ok_or(CliError::NotConfigured)?;
    tracing::debug!("Using remote {}", config.base_url);
    Ok(RegistryStore::new(HttpProxy::new(Some(config))?))
}

pub fn http_icon_resolver() -> Result<IconResolver<HttpImageLoader>, CliError> {
    Ok(IconResolver::new(HttpImageLoader::new()?))
}

/// Ask for a y/N answer on stdin unless `assume_yes` is set.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<(), CliError> {
    if assume_yes {
        return Ok(());
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::ConfirmationRequired);
    }

    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    if is_affirmative(&answer) {
        Ok(())
    } else {
        Err(CliError::Aborted)
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Convert a 1-based position typed by the user into an index.
pub fn resolve_position(position: usize, len: usize) -> Result<usize, CliError> {
    if position == 0 || position > len {
        return Err(CliError::InvalidPosition {
            given: position,
            max: len,
        });
    }
    Ok(position - 1)
}

pub fn site_to_list_item(registry: &Registry, name: &str, entry: &SiteEntry) -> SiteListItem {
    SiteListItem {
        position: registry.position(name).map_or(0, |index| index + 1),
        name: name.to_string(),
        secret: mask_secret(&entry.secret),
        urls: entry.urls.clone(),
        has_icon: entry.icon.is_some(),
    }
}

pub fn list_items(registry: &Registry, order: SortOrder) -> Vec<SiteListItem> {
    sorted_view(registry, order)
        .into_iter()
        .map(|(name, entry)| site_to_list_item(registry, name, entry))
        .collect()
}

/// One line per site. Positions always refer to the stored order.
pub fn format_site_lines(registry: &Registry, order: SortOrder) -> Vec<String> {
    list_items(registry, order)
        .into_iter()
        .map(|item| {
            let icon_marker = if item.has_icon { " [icon]" } else { "" };
            if item.urls.is_empty() {
                format!("{:>3}. {}  {}{icon_marker}", item.position, item.name, item.secret)
            } else {
                format!(
                    "{:>3}. {}  {}  {}{icon_marker}",
                    item.position,
                    item.name,
                    item.secret,
                    item.urls.join(", ")
                )
            }
        })
        .collect()
}

pub fn site_count_summary(count: usize) -> String {
    if count == 1 {
        "1 site".to_string()
    } else {
        format!("{count} sites")
    }
}
