//! Ordered site registry model

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::SiteEntry;

/// Ordered mapping of site name to [`SiteEntry`].
///
/// Insertion order is presentation order and is serialized as object key
/// order, so it survives a round trip through the remote registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<(String, SiteEntry)>,
}

impl Registry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SiteEntry> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SiteEntry> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Index of `name` in registry order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }

    /// Insert or replace an entry.
    ///
    /// Replacing keeps the existing position; new names are appended.
    pub fn insert(&mut self, name: impl Into<String>, entry: SiteEntry) -> Option<SiteEntry> {
        let name = name.into();
        if let Some(slot) = self.get_mut(&name) {
            return Some(std::mem::replace(slot, entry));
        }
        self.entries.push((name, entry));
        None
    }

    /// Remove an entry, keeping the relative order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<SiteEntry> {
        let index = self.position(name)?;
        Some(self.entries.remove(index).1)
    }

    /// Site names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SiteEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Rebuild the registry following `order`.
    ///
    /// Names missing from the registry are skipped; the result only contains
    /// entries named in `order`.
    #[must_use]
    pub fn reordered<S: AsRef<str>>(&self, order: &[S]) -> Self {
        order
            .iter()
            .filter_map(|name| {
                self.get(name.as_ref())
                    .map(|entry| (name.as_ref().to_string(), entry.clone()))
            })
            .collect()
    }

    /// Names of entries that violate the non-empty secret invariant.
    pub fn invalid_entries(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, entry)| !entry.is_persistable())
            .map(|(name, _)| name)
            .collect()
    }
}

impl FromIterator<(String, SiteEntry)> for Registry {
    fn from_iter<T: IntoIterator<Item = (String, SiteEntry)>>(iter: T) -> Self {
        let mut registry = Self::new();
        for (name, entry) in iter {
            registry.insert(name, entry);
        }
        registry
    }
}

impl IntoIterator for Registry {
    type Item = (String, SiteEntry);
    type IntoIter = std::vec::IntoIter<(String, SiteEntry)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Registry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RegistryVisitor)
    }
}

struct RegistryVisitor;

impl<'de> Visitor<'de> for RegistryVisitor {
    type Value = Registry;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object mapping site names to entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut registry = Registry::new();
        while let Some((name, entry)) = access.next_entry::<String, SiteEntry>()? {
            registry.insert(name, entry);
        }
        Ok(registry)
    }

    // The remote answers `null` when no site has been configured yet.
    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Registry::new())
    }
}
