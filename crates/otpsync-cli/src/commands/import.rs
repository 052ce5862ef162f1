use std::path::Path;

use otpsync_core::proxy::ProxyChannel;
use otpsync_core::transfer::{parse_document, ImportExportBridge};
use otpsync_core::RegistryStore;

use crate::commands::common::confirm;
use crate::error::CliError;

pub async fn run_import<P: ProxyChannel>(
    store: &mut RegistryStore<P>,
    path: &Path,
    assume_yes: bool,
) -> Result<(), CliError> {
    let document = std::fs::read_to_string(path)?;
    let incoming = parse_document(&document)?;

    confirm(
        &format!(
            "Replace the remote registry with {} sites from {}? Existing sites not in the file will be deleted.",
            incoming.len(),
            path.display()
        ),
        assume_yes,
    )?;

    let imported = ImportExportBridge::new(store).import(&document).await?;
    println!("Imported {} sites", imported.len());
    Ok(())
}
