use otpsync_core::proxy::ProxyChannel;
use otpsync_core::reorder::ReorderController;
use otpsync_core::RegistryStore;

use crate::commands::common::resolve_position;
use crate::error::CliError;

pub async fn run_move<P: ProxyChannel>(
    store: &mut RegistryStore<P>,
    from: usize,
    to: usize,
) -> Result<(), CliError> {
    let order = move_site(store, from, to).await?;
    for (index, name) in order.iter().enumerate() {
        println!("{:>3}. {name}", index + 1);
    }
    Ok(())
}

/// Move using 1-based positions in stored order.
pub async fn move_site<P: ProxyChannel>(
    store: &mut RegistryStore<P>,
    from: usize,
    to: usize,
) -> Result<Vec<String>, CliError> {
    let len = store.fetch().await?.len();
    let from = resolve_position(from, len)?;
    let to = resolve_position(to, len)?;
    Ok(ReorderController::new(store).reorder(from, to).await?)
}
