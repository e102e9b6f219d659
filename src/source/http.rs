//! HTTP/JSON profile source.
//!
//! Requires the `http` feature. Issues `GET {base_url}/{users_path}` and
//! decodes a JSON array of [`RawProfile`]. Request and response bodies are
//! logged at `debug` level under the `profile_store::source::http` target.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ProfileSource;
use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::profile::RawProfile;

pub struct HttpProfileSource {
    client: reqwest::Client,
    url: String,
}

impl HttpProfileSource {
    /// Source for `{base_url}/users` with default client settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        let config = SourceConfig::new(base_url);
        Self {
            client: reqwest::Client::new(),
            url: config.users_url(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: config.users_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn fetch_all(&self) -> Result<Vec<RawProfile>, FetchError> {
        debug!(url = %self.url, "GET profiles");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "profile request failed");
            FetchError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), body = %body, "profiles response");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
