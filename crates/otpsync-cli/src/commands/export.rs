use std::path::{Path, PathBuf};

use otpsync_core::proxy::ProxyChannel;
use otpsync_core::transfer::{ImportExportBridge, EXPORT_FILE_NAME};
use otpsync_core::RegistryStore;

use crate::error::CliError;

pub async fn run_export<P: ProxyChannel>(
    store: &mut RegistryStore<P>,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let document = ImportExportBridge::new(store).export().await?;

    if let Some(path) = output_path {
        let target = export_target(path);
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&target, document)?;
        println!("{}", target.display());
    } else {
        println!("{document}");
    }

    Ok(())
}

/// A directory target receives the default export file name.
pub fn export_target(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(EXPORT_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}
