//! Connection settings workflows: test, repair and clear.

use std::path::Path;

use crate::config::LocalState;
use crate::models::ConnectionConfig;
use crate::proxy::ProxyChannel;
use crate::Result;

/// Hand the settings to the proxy and probe the remote with `fetchCodes`.
///
/// On success the settings are persisted with `connection_tested = true` and
/// the number of sites found is returned. On failure the flag is cleared and
/// persisted while the previous settings stay in place.
pub async fn test_connection<P: ProxyChannel>(
    proxy: &P,
    state: &mut LocalState,
    state_path: &Path,
    base_url: &str,
    api_key: &str,
) -> Result<usize> {
    let config = ConnectionConfig::new(base_url, api_key)?;
    proxy.save_api_config(&config).await?;

    match proxy.fetch_codes().await {
        Ok(sites) => {
            state.api_config = Some(config);
            state.connection_tested = true;
            state.save_to_path(state_path)?;
            tracing::info!("Connection test succeeded, {} sites found", sites.len());
            Ok(sites.len())
        }
        Err(error) => {
            tracing::warn!("Connection test failed: {}", error);
            state.connection_tested = false;
            state.save_to_path(state_path)?;
            Err(error)
        }
    }
}

/// Force the proxy to reset to `base_url`/`api_key` and persist them.
pub async fn repair_connection<P: ProxyChannel>(
    proxy: &P,
    state: &mut LocalState,
    state_path: &Path,
    base_url: &str,
    api_key: &str,
) -> Result<()> {
    let config = ConnectionConfig::new(base_url, api_key)?;
    proxy.reset_api_config(&config).await?;

    state.api_config = Some(config);
    state.save_to_path(state_path)?;
    tracing::info!("Connection settings repaired");
    Ok(())
}

/// Drop every locally persisted setting. The remote registry is untouched.
pub fn clear_local_state(state: &mut LocalState, state_path: &Path) -> Result<()> {
    *state = LocalState::default();
    LocalState::clear_at_path(state_path)
}
