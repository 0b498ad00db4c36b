use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::traits::SignatureSource;
use crate::config::SourceConfig;
use crate::errors::{ClassifierError, ClassifierResult};
use crate::utils::url::UrlUtils;

/// Downloads the signature database over HTTP
pub struct HttpSignatureSource {
    client: Client,
    url: String,
}

impl HttpSignatureSource {
    pub fn new<S: Into<String>>(
        url: S,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> ClassifierResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(concat!("uas-classifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClassifierError::configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &SourceConfig) -> ClassifierResult<Self> {
        Self::new(
            config.ini_url.clone(),
            config.connect_timeout,
            config.request_timeout,
        )
    }

    fn fetch_error<M: Into<String>>(&self, message: M) -> ClassifierError {
        let message = UrlUtils::obfuscate_credentials(&message.into());
        ClassifierError::fetch(self.describe(), message)
    }
}

#[async_trait]
impl SignatureSource for HttpSignatureSource {
    async fn fetch(&self) -> ClassifierResult<String> {
        debug!("Fetching signature database from: {}", self.describe());

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.fetch_error(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.fetch_error(format!("Failed to read response: {e}")))?;

        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| self.fetch_error(format!("Failed to decode content as UTF-8: {e}")))?;

        debug!("Fetched {} bytes of signature data", text.len());
        Ok(text)
    }

    fn describe(&self) -> String {
        UrlUtils::obfuscate_credentials(&self.url)
    }
}
