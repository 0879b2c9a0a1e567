//! HTTP client for the Arti Capital backend
//!
//! All catalog and upload calls go through [`CapitalClient`]: HTTP Basic auth
//! with the fixed service credential pair, `Accept: application/json`, and a
//! bounded 15 second timeout so a dead network surfaces as an explicit error
//! instead of a hung share sheet.
//!
//! Responses are read as text and decoded with `serde_json` in a second step,
//! which keeps transport failures ([`ShareError::Network`]) distinct from
//! malformed bodies ([`ShareError::InvalidResponse`]).

use crate::error::{Result, ShareError};
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Production service root
pub const DEFAULT_BASE_URL: &str = "https://api.office701.com/arti-capital/service";

/// Fixed service credential pair (HTTP Basic)
pub const BASIC_USER: &str = "Tr1VAhW2ICWHJN2nlvp9K5ycGoyMJM";
pub const BASIC_PASS: &str = "vRParTCAqTjtmkI17I1EVpPH57Edl0";

/// Request timeout applied to connect and total duration
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

lazy_static! {
    static ref SHARED_CLIENT: CapitalClient =
        CapitalClient::new(ClientConfig::default()).expect("default client config is valid");
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub basic_user: String,
    pub basic_pass: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            basic_user: BASIC_USER.to_string(),
            basic_pass: BASIC_PASS.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Config pointing at a different service root (tests, staging)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// HTTP client for the Arti Capital service API
#[derive(Debug, Clone)]
pub struct CapitalClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl CapitalClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config: ClientConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    /// Process-wide client with the production configuration
    pub fn shared() -> &'static CapitalClient {
        &SHARED_CLIENT
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    fn apply_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .basic_auth(&self.config.basic_user, Some(&self.config.basic_pass))
            .header("Accept", "application/json")
    }

    /// GET with query parameters, decoded into `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.build_url(path);
        tracing::debug!(%url, "GET");

        let mut request = self.apply_headers(self.client.get(&url));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        self.decode(response).await
    }

    /// POST a JSON body, decoded into `T`
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.build_url(path);
        tracing::debug!(%url, "POST");

        let request = self.apply_headers(self.client.post(&url).json(body));
        let response = request.send().await?;
        self.decode(response).await
    }

    /// PUT a JSON body, decoded into `T`
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.build_url(path);
        tracing::debug!(%url, "PUT");

        let request = self.apply_headers(self.client.put(&url).json(body));
        let response = request.send().await?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ShareError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ShareError::InvalidResponse {
            message: e.to_string(),
            response_body: Some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_normalizes_slashes() {
        let client =
            CapitalClient::new(ClientConfig::with_base_url("http://localhost:9999/")).unwrap();
        assert_eq!(
            client.build_url("/user/account/projects/all"),
            "http://localhost:9999/user/account/projects/all"
        );
        assert_eq!(
            client.build_url("user/account/projects/42"),
            "http://localhost:9999/user/account/projects/42"
        );
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }
}
