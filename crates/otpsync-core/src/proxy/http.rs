//! HTTP implementation of the proxy channel against the remote plugin API.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::models::{ConnectionConfig, Registry};
use crate::util::compact_text;
use crate::{Error, Result};

use super::ProxyChannel;

/// Route prefix of the two-factor plugin on the remote server.
pub const PLUGIN_API_PATH: &str = "/api/v1/plugin/twofahelper";

/// Talks to the remote registry over HTTP with the configured API key.
#[derive(Debug)]
pub struct HttpProxy {
    client: Client,
    config: RwLock<Option<ConnectionConfig>>,
}

impl HttpProxy {
    /// Builds a proxy, optionally preloaded with connection settings.
    pub fn new(config: Option<ConnectionConfig>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|error| Error::proxy(format!("failed to construct HTTP client: {error}")))?;
        Ok(Self {
            client,
            config: RwLock::new(config),
        })
    }

    async fn connection(&self) -> Result<ConnectionConfig> {
        self.config
            .read()
            .await
            .clone()
            .filter(ConnectionConfig::is_complete)
            .ok_or_else(|| Error::proxy("connection is not configured"))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        action: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|error| {
                tracing::warn!("{} request failed: {}", action, error);
                Error::proxy(format!("{action} request failed: {error}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| Error::proxy(format!("failed to read {action} response: {error}")))?;
        parse_envelope(action, status, &body)
    }
}

fn endpoint(config: &ConnectionConfig, route: &str) -> String {
    format!("{}{PLUGIN_API_PATH}{route}", config.base_url)
}

/// Response wrapper used by the plugin API.
///
/// Configuration routes answer `{success, message, data}`, code routes answer
/// `{code, message, data}` with `code == 0` meaning success.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: Option<bool>,
    code: Option<i64>,
    message: Option<String>,
    data: Option<T>,
}

fn parse_envelope<T: DeserializeOwned>(
    action: &str,
    status: StatusCode,
    body: &str,
) -> Result<Option<T>> {
    if !status.is_success() {
        let detail = compact_text(body);
        return Err(Error::proxy(if detail.is_empty() {
            format!("{action} failed with HTTP {}", status.as_u16())
        } else {
            format!("{action} failed with HTTP {}: {detail}", status.as_u16())
        }));
    }

    let envelope = serde_json::from_str::<ApiEnvelope<T>>(body).map_err(|error| {
        Error::proxy(format!("invalid {action} response: {error}"))
    })?;
    let succeeded = envelope
        .success
        .unwrap_or_else(|| envelope.code == Some(0));
    if !succeeded {
        let message = envelope
            .message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("{action} was rejected"));
        return Err(Error::Proxy(message));
    }

    Ok(envelope.data)
}

impl ProxyChannel for HttpProxy {
    async fn fetch_config(&self) -> Result<Registry> {
        let config = self.connection().await?;
        let request = self
            .client
            .get(endpoint(&config, "/config"))
            .query(&[("apikey", config.api_key.as_str())]);
        let registry = self
            .send::<Registry>("fetchConfig", request)
            .await?
            .unwrap_or_default();
        tracing::debug!("Fetched remote registry with {} sites", registry.len());
        Ok(registry)
    }

    async fn update_config(&self, registry: &Registry) -> Result<()> {
        let config = self.connection().await?;
        let request = self
            .client
            .post(endpoint(&config, "/update_config"))
            .query(&[("apikey", config.api_key.as_str())])
            .json(registry);
        self.send::<serde_json::Value>("updateConfig", request)
            .await?;
        Ok(())
    }

    async fn fetch_codes(&self) -> Result<Vec<String>> {
        let config = self.connection().await?;
        let request = self
            .client
            .get(endpoint(&config, "/get_codes"))
            .query(&[("apikey", config.api_key.as_str())]);
        let codes = self
            .send::<serde_json::Map<String, serde_json::Value>>("fetchCodes", request)
            .await?
            .unwrap_or_default();
        Ok(codes.keys().cloned().collect())
    }

    async fn save_api_config(&self, config: &ConnectionConfig) -> Result<()> {
        *self.config.write().await = Some(config.clone());
        Ok(())
    }

    async fn reset_api_config(&self, config: &ConnectionConfig) -> Result<()> {
        if !config.is_complete() {
            return Err(Error::proxy("server address and API key are required"));
        }
        let mut held = self.config.write().await;
        *held = Some(config.clone());
        tracing::info!("Connection settings reset for {}", config.base_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoint_joins_plugin_route() {
        let config = ConnectionConfig::new("mp.example.com/", "key").unwrap();
        assert_eq!(
            endpoint(&config, "/config"),
            "https://mp.example.com/api/v1/plugin/twofahelper/config"
        );
    }

    #[test]
    fn success_envelope_yields_ordered_registry() {
        let body = r#"{"success":true,"message":"获取成功","data":{"b":{"secret":"B"},"a":{"secret":"A"}}}"#;
        let registry = parse_envelope::<Registry>("fetchConfig", StatusCode::OK, body)
            .unwrap()
            .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn rejected_envelope_carries_server_message() {
        let body = r#"{"success":false,"message":"API令牌错误!"}"#;
        let error = parse_envelope::<Registry>("fetchConfig", StatusCode::OK, body).unwrap_err();
        assert_eq!(error.to_string(), "Proxy error: API令牌错误!");
    }

    #[test]
    fn code_envelope_uses_zero_as_success() {
        let ok = r#"{"code":0,"message":"成功","data":{"github":{"code":"123456"}}}"#;
        let data =
            parse_envelope::<serde_json::Map<String, serde_json::Value>>("fetchCodes", StatusCode::OK, ok)
                .unwrap()
                .unwrap();
        assert!(data.contains_key("github"));

        let failed = r#"{"code":2,"message":"API令牌错误!"}"#;
        assert!(parse_envelope::<serde_json::Value>("fetchCodes", StatusCode::OK, failed).is_err());
    }

    #[test]
    fn http_error_status_is_reported_with_body() {
        let error = parse_envelope::<serde_json::Value>(
            "updateConfig",
            StatusCode::UNAUTHORIZED,
            "  unauthorized  ",
        )
        .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Proxy error: updateConfig failed with HTTP 401: unauthorized"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn actions_fail_without_connection_settings() {
        let proxy = HttpProxy::new(None).unwrap();
        let error = proxy.fetch_config().await.unwrap_err();
        assert!(matches!(error, Error::Proxy(message) if message.contains("not configured")));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn reset_rejects_incomplete_settings() {
        let proxy = HttpProxy::new(None).unwrap();
        let incomplete = ConnectionConfig {
            base_url: "https://mp.example.com".to_string(),
            api_key: String::new(),
        };
        assert!(proxy.reset_api_config(&incomplete).await.is_err());
    }
}
