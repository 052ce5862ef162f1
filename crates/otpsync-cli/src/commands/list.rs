use otpsync_core::proxy::ProxyChannel;
use otpsync_core::reorder::SortOrder;
use otpsync_core::RegistryStore;

use crate::commands::common::{format_site_lines, list_items, site_count_summary};
use crate::error::CliError;

pub async fn run_list<P: ProxyChannel>(
    store: &mut RegistryStore<P>,
    order: SortOrder,
    as_json: bool,
) -> Result<(), CliError> {
    let registry = store.fetch().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&list_items(registry, order))?);
    } else if registry.is_empty() {
        println!("No sites configured");
    } else {
        for line in format_site_lines(registry, order) {
            println!("{line}");
        }
        println!("{}", site_count_summary(registry.len()));
    }

    Ok(())
}
