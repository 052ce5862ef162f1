use otpsync_core::proxy::ProxyChannel;
use otpsync_core::RegistryStore;

use crate::commands::common::confirm;
use crate::error::CliError;

pub async fn run_delete<P: ProxyChannel>(
    store: &mut RegistryStore<P>,
    name: &str,
    assume_yes: bool,
) -> Result<(), CliError> {
    if !store.fetch().await?.contains(name) {
        return Err(CliError::SiteNotFound(name.to_string()));
    }

    confirm(&format!("Delete site '{name}'?"), assume_yes)?;
    store.delete_site(name).await?;
    println!("{name}");
    Ok(())
}
