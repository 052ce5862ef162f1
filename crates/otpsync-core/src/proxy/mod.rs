//! Request/response contract with the background proxy.
//!
//! The proxy brokers every remote read and write. Each action is a single
//! round trip; failures come back as [`Error::Proxy`](crate::Error::Proxy).

use std::future::Future;

use crate::models::{ConnectionConfig, Registry};
use crate::Result;

mod http;
mod memory;

pub use http::{HttpProxy, PLUGIN_API_PATH};
pub use memory::InMemoryProxy;

/// Message actions understood by the background proxy.
pub trait ProxyChannel {
    /// `fetchConfig`: the full remote registry.
    fn fetch_config(&self) -> impl Future<Output = Result<Registry>> + Send;

    /// `updateConfig`: replace the entire remote registry.
    fn update_config(&self, registry: &Registry) -> impl Future<Output = Result<()>> + Send;

    /// `fetchCodes`: names of the sites the remote currently generates codes for.
    fn fetch_codes(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// `saveApiConfig`: hand new connection settings to the proxy.
    fn save_api_config(&self, config: &ConnectionConfig)
        -> impl Future<Output = Result<()>> + Send;

    /// `resetApiConfig`: force the proxy to drop its state and adopt `config`.
    fn reset_api_config(
        &self,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl<P: ProxyChannel> ProxyChannel for &P {
    fn fetch_config(&self) -> impl Future<Output = Result<Registry>> + Send {
        (**self).fetch_config()
    }

    fn update_config(&self, registry: &Registry) -> impl Future<Output = Result<()>> + Send {
        (**self).update_config(registry)
    }

    fn fetch_codes(&self) -> impl Future<Output = Result<Vec<String>>> + Send {
        (**self).fetch_codes()
    }

    fn save_api_config(
        &self,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).save_api_config(config)
    }

    fn reset_api_config(
        &self,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).reset_api_config(config)
    }
}
