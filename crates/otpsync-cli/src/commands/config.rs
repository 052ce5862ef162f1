use std::env;
use std::path::Path;

use otpsync_core::config::LocalState;
use otpsync_core::connection::{clear_local_state, repair_connection, test_connection};
use otpsync_core::proxy::HttpProxy;
use otpsync_core::util::{mask_secret, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::commands::common::{confirm, load_state, site_count_summary};
use crate::error::CliError;

pub const BASE_URL_ENV: &str = "OTPSYNC_BASE_URL";
pub const API_KEY_ENV: &str = "OTPSYNC_API_KEY";

pub async fn run_config(command: ConfigCommands, state_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Test { base_url, api_key } => {
            run_config_test(base_url, api_key, state_path).await
        }
        ConfigCommands::Repair { base_url, api_key } => {
            run_config_repair(base_url, api_key, state_path).await
        }
        ConfigCommands::Show => run_config_show(state_path),
        ConfigCommands::Clear { yes } => run_config_clear(yes, state_path),
    }
}

pub async fn run_config_test(
    base_url: Option<String>,
    api_key: Option<String>,
    state_path: &Path,
) -> Result<(), CliError> {
    let mut state = load_state(state_path)?;
    let (base_url, api_key) =
        resolve_connection_input(base_url, api_key, |key| env::var(key).ok(), &state)?;

    let proxy = HttpProxy::new(state.connection().cloned())?;
    let site_count = test_connection(&proxy, &mut state, state_path, &base_url, &api_key).await?;
    println!("Connected, {} found", site_count_summary(site_count));
    Ok(())
}

pub async fn run_config_repair(
    base_url: Option<String>,
    api_key: Option<String>,
    state_path: &Path,
) -> Result<(), CliError> {
    let mut state = load_state(state_path)?;
    let (base_url, api_key) =
        resolve_connection_input(base_url, api_key, |key| env::var(key).ok(), &state)?;

    let proxy = HttpProxy::new(state.connection().cloned())?;
    repair_connection(&proxy, &mut state, state_path, &base_url, &api_key).await?;
    println!("Connection settings repaired");
    Ok(())
}

pub fn run_config_show(state_path: &Path) -> Result<(), CliError> {
    let state = load_state(state_path)?;
    for line in format_state_lines(&state, state_path) {
        println!("{line}");
    }
    Ok(())
}

pub fn run_config_clear(assume_yes: bool, state_path: &Path) -> Result<(), CliError> {
    confirm(
        "Remove all local settings? The remote registry is not affected.",
        assume_yes,
    )?;
    let mut state = load_state(state_path)?;
    clear_local_state(&mut state, state_path)?;
    println!("Local settings cleared");
    Ok(())
}

/// Explicit flag, then environment, then the stored settings.
pub fn resolve_connection_input<F>(
    base_url: Option<String>,
    api_key: Option<String>,
    env_lookup: F,
    state: &LocalState,
) -> Result<(String, String), CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let stored = state.api_config.as_ref();

    let base_url = normalize_text_option(base_url)
        .or_else(|| normalize_text_option(env_lookup(BASE_URL_ENV)))
        .or_else(|| stored.and_then(|config| normalize_text_option(Some(config.base_url.clone()))))
        .ok_or_else(|| {
            CliError::Config(format!("Missing server address. Use --base-url or {BASE_URL_ENV}"))
        })?;
    let api_key = normalize_text_option(api_key)
        .or_else(|| normalize_text_option(env_lookup(API_KEY_ENV)))
        .or_else(|| stored.and_then(|config| normalize_text_option(Some(config.api_key.clone()))))
        .ok_or_else(|| {
            CliError::Config(format!("Missing API key. Use --api-key or {API_KEY_ENV}"))
        })?;

    Ok((base_url, api_key))
}

pub fn format_state_lines(state: &LocalState, state_path: &Path) -> Vec<String> {
    let mut lines = vec![format!("State file: {}", state_path.display())];
    match state.api_config.as_ref() {
        Some(config) => {
            lines.push(format!("Server: {}", config.base_url));
            lines.push(format!("API key: {}", mask_secret(&config.api_key)));
        }
        None => lines.push("Server: (not configured)".to_string()),
    }
    lines.push(format!(
        "Connection tested: {}",
        if state.connection_tested { "yes" } else { "no" }
    ));
    lines
}
