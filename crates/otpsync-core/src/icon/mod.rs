//! Site icon resolution.
//!
//! Automatic resolution walks an ordered chain of favicon sources and stops at
//! the first one that yields a decodable image. User uploads bypass the chain
//! entirely.

use std::future::Future;

use reqwest::Client;

use crate::util::compact_text;
use crate::{Error, Result};

mod raster;
mod upload;

pub use raster::{data_url, rasterize_to_data_url};
pub use upload::{encode_icon_upload, load_icon_file, MAX_ICON_FILE_BYTES};

/// One favicon source of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconProvider {
    /// `https://{host}/favicon.ico`
    DirectFavicon,
    /// Google's favicon-by-domain service
    Google,
    /// DuckDuckGo's favicon-by-domain service
    DuckDuckGo,
}

impl IconProvider {
    /// Default resolution order.
    pub const CHAIN: [Self; 3] = [Self::DirectFavicon, Self::Google, Self::DuckDuckGo];

    #[must_use]
    pub fn source_url(self, host: &str) -> String {
        match self {
            Self::DirectFavicon => format!("https://{host}/favicon.ico"),
            Self::Google => format!(
                "https://www.google.com/s2/favicons?domain={}&sz=64",
                urlencoding::encode(host)
            ),
            Self::DuckDuckGo => format!("https://icons.duckduckgo.com/ip3/{host}.ico"),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DirectFavicon => "favicon",
            Self::Google => "google",
            Self::DuckDuckGo => "duckduckgo",
        }
    }
}

/// Fetches raw image bytes from a URL.
pub trait ImageLoader {
    fn load(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// [`ImageLoader`] over plain HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|error| Error::proxy(format!("failed to construct HTTP client: {error}")))?;
        Ok(Self { client })
    }
}

impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header("Accept", "image/*")
            .send()
            .await
            .map_err(|error| Error::proxy(format!("icon request failed: {error}")))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::proxy(format!(
                "icon request failed with HTTP {status}: {}",
                compact_text(&body)
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| Error::proxy(format!("failed to read icon bytes: {error}")))?;
        Ok(bytes.to_vec())
    }
}

/// Host part of a site URL; the raw input when it does not parse.
#[must_use]
pub fn icon_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(ToString::to_string))
        .unwrap_or_else(|| url.trim().to_string())
}

/// Resolves a site icon through an ordered provider chain.
#[derive(Debug, Clone)]
pub struct IconResolver<L> {
    loader: L,
    providers: Vec<IconProvider>,
}

impl<L: ImageLoader> IconResolver<L> {
    /// Resolver using the default [`IconProvider::CHAIN`].
    pub fn new(loader: L) -> Self {
        Self::with_providers(loader, IconProvider::CHAIN.to_vec())
    }

    pub const fn with_providers(loader: L, providers: Vec<IconProvider>) -> Self {
        Self { loader, providers }
    }

    /// Try each provider in turn; `None` once the chain is exhausted.
    pub async fn resolve(&self, url: &str) -> Option<String> {
        let host = icon_host(url);
        if host.is_empty() {
            return None;
        }

        for provider in &self.providers {
            match self.attempt(*provider, &host).await {
                Ok(encoded) => {
                    tracing::debug!("Resolved icon for {} via {}", host, provider.label());
                    return Some(encoded);
                }
                Err(error) => {
                    tracing::warn!(
                        "Icon source {} failed for {}: {}",
                        provider.label(),
                        host,
                        error
                    );
                }
            }
        }

        tracing::info!("No icon source succeeded for {}", host);
        None
    }

    /// Resolve only when no icon is held; an existing icon is returned untouched.
    pub async fn resolve_missing(&self, current: Option<String>, urls: &[String]) -> Option<String> {
        if current.is_some() {
            return current;
        }
        let url = urls.first()?;
        self.resolve(url).await
    }

    async fn attempt(&self, provider: IconProvider, host: &str) -> Result<String> {
        let source = provider.source_url(host);
        tracing::debug!("Loading icon from {}", source);
        let bytes = self.loader.load(&source).await?;
        rasterize_to_data_url(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::raster::tests::source_png;
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FakeLoader {
        responses: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLoader {
        fn respond(mut self, url: &str, bytes: Vec<u8>) -> Self {
            self.responses.insert(url.to_string(), bytes);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ImageLoader for FakeLoader {
        async fn load(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Proxy(format!("404 for {url}")))
        }
    }

    const DIRECT: &str = "https://github.com/favicon.ico";
    const GOOGLE: &str = "https://www.google.com/s2/favicons?domain=github.com&sz=64";
    const DDG: &str = "https://icons.duckduckgo.com/ip3/github.com.ico";

    #[test]
    fn icon_host_extracts_hostname() {
        assert_eq!(icon_host("https://github.com/login?x=1"), "github.com");
        assert_eq!(icon_host("http://10.0.0.2:8080"), "10.0.0.2");
        assert_eq!(icon_host("not a url"), "not a url");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn first_successful_stage_short_circuits() {
        let png = source_png(16, 16);
        let resolver = IconResolver::new(FakeLoader::default().respond(DIRECT, png.clone()));

        let icon = resolver.resolve("https://github.com").await;
        assert_eq!(icon, Some(rasterize_to_data_url(&png).unwrap()));
        assert_eq!(resolver.loader.calls(), vec![DIRECT]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn third_stage_wins_when_first_two_fail() {
        let third = source_png(32, 32);
        let loader = FakeLoader::default()
            // Loads but cannot be rasterized, like a tainted canvas.
            .respond(GOOGLE, b"opaque".to_vec())
            .respond(DDG, third.clone());
        let resolver = IconResolver::new(loader);

        let icon = resolver.resolve("https://github.com/").await;
        assert_eq!(icon, Some(rasterize_to_data_url(&third).unwrap()));
        assert_eq!(resolver.loader.calls(), vec![DIRECT, GOOGLE, DDG]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn exhausted_chain_resolves_to_none() {
        let resolver = IconResolver::new(FakeLoader::default());
        assert_eq!(resolver.resolve("https://github.com").await, None);
        assert_eq!(resolver.loader.calls().len(), 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn resolve_missing_never_overwrites_existing_icon() {
        let resolver =
            IconResolver::new(FakeLoader::default().respond(DIRECT, source_png(8, 8)));
        let chosen = Some("data:image/png;base64,USER".to_string());

        let kept = resolver
            .resolve_missing(chosen.clone(), &["https://github.com".to_string()])
            .await;
        assert_eq!(kept, chosen);
        assert!(resolver.loader.calls().is_empty());

        let resolved = resolver
            .resolve_missing(None, &["https://github.com".to_string()])
            .await;
        assert!(resolved.is_some());
        assert_eq!(resolver.resolve_missing(None, &[]).await, None);
    }
}
