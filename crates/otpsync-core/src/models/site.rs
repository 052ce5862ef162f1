//! Site entry model

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::util::{normalize_url, parse_urls, strip_secret};
use crate::{Error, Result};

/// One credential record of the registry.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteEntry {
    /// Opaque shared secret, stored without whitespace
    #[serde(default)]
    pub secret: String,
    /// Normalized URLs associated with the site
    #[serde(default, deserialize_with = "null_as_empty")]
    pub urls: Vec<String>,
    /// Encoded image (data URL), if any
    #[serde(default)]
    pub icon: Option<String>,
}

impl SiteEntry {
    /// Build an entry, stripping whitespace from the secret and normalizing URLs.
    #[must_use]
    pub fn new<I, S>(secret: &str, urls: I, icon: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            secret: strip_secret(secret),
            urls: urls
                .into_iter()
                .map(|url| normalize_url(url.as_ref()))
                .filter(|url| !url.is_empty())
                .collect(),
            icon,
        }
    }

    /// First URL of the entry, used for icon resolution.
    #[must_use]
    pub fn primary_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    /// Whether the entry can be persisted (non-empty secret).
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        !self.secret.is_empty()
    }
}

impl fmt::Debug for SiteEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SiteEntry")
            .field("secret", &"[REDACTED]")
            .field("urls", &self.urls)
            .field("icon", &self.icon.as_ref().map(String::len))
            .finish()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Raw add/edit form input for a single site.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SiteDraft {
    pub name: String,
    pub secret: String,
    /// Newline-separated URLs as typed by the user
    pub urls_text: String,
    /// Icon chosen or resolved for this edit; `None` keeps an existing icon on update
    pub icon: Option<String>,
}

impl SiteDraft {
    /// Prefill a draft from an existing entry (the edit flow).
    #[must_use]
    pub fn from_entry(name: &str, entry: &SiteEntry) -> Self {
        Self {
            name: name.to_string(),
            secret: entry.secret.clone(),
            urls_text: entry.urls.join("\n"),
            icon: entry.icon.clone(),
        }
    }

    /// Normalized URLs of the draft.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        parse_urls(&self.urls_text)
    }

    /// Validate the draft and turn it into a named entry.
    pub fn into_entry(self) -> Result<(String, SiteEntry)> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("site name is required"));
        }
        let urls = self.urls();
        let entry = SiteEntry::new(&self.secret, urls, self.icon);
        if !entry.is_persistable() {
            return Err(Error::validation("TOTP secret is required"));
        }
        Ok((name, entry))
    }
}

impl fmt::Debug for SiteDraft {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SiteDraft")
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .field("urls_text", &self.urls_text)
            .field("icon", &self.icon.as_ref().map(String::len))
            .finish()
    }
}
