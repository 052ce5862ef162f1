//! Manual reordering of registry entries.
//!
//! Positions always refer to the stored (committed) order. The name sorts in
//! [`SortOrder`] only shape what is displayed and are never committed.

use std::cmp::Ordering;

use crate::models::{Registry, SiteEntry};
use crate::proxy::ProxyChannel;
use crate::store::RegistryStore;
use crate::{Error, Result};

/// Display-only ordering of the site list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Stored order
    #[default]
    Default,
    NameAsc,
    NameDesc,
}

/// Entries of `registry` arranged for display. Does not modify the registry.
pub fn sorted_view(registry: &Registry, order: SortOrder) -> Vec<(&str, &SiteEntry)> {
    let mut entries = registry.iter().collect::<Vec<_>>();
    match order {
        SortOrder::Default => {}
        SortOrder::NameAsc => entries.sort_by(|(left, _), (right, _)| compare_names(left, right)),
        SortOrder::NameDesc => entries.sort_by(|(left, _), (right, _)| compare_names(right, left)),
    }
    entries
}

fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

/// Move the item at `from` so that it ends up at index `to`.
///
/// Matches a drag gesture: moving later inserts after the drop target, moving
/// earlier inserts before it. Either way the dragged item lands on `to`.
pub fn move_entry<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(Error::validation(format!(
            "position out of range: {from} -> {to} (have {len} entries)"
        )));
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Commits positional rearrangements through a [`RegistryStore`].
#[derive(Debug)]
pub struct ReorderController<'a, P> {
    store: &'a mut RegistryStore<P>,
}

impl<'a, P: ProxyChannel> ReorderController<'a, P> {
    pub fn new(store: &'a mut RegistryStore<P>) -> Self {
        Self { store }
    }

    /// Move the entry at `from` to `to` within the held registry and commit
    /// the re-sequenced map. Returns the new order of names.
    pub async fn reorder(&mut self, from: usize, to: usize) -> Result<Vec<String>> {
        let mut order = self
            .store
            .mirror()
            .names()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        move_entry(&mut order, from, to)?;
        if from == to {
            return Ok(order);
        }

        let registry = self.store.mirror().reordered(&order);
        self.store.commit(registry).await.inspect_err(|error| {
            tracing::warn!("Failed to save custom order: {}", error);
        })?;
        tracing::info!("Saved custom order, moved position {} to {}", from, to);
        Ok(order)
    }
}
