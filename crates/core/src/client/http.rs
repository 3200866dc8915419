use crate::client::error::ApiError;
use crate::client::Transport;
use crate::config::Settings;
use anyhow::Context;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    base_url_text: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("invalid backend base URL: {base_url}"))?;
        anyhow::ensure!(
            !parsed.cannot_be_a_base(),
            "backend base URL cannot carry a path: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build backend http client")?;

        Ok(Self {
            http,
            base_url: parsed,
            base_url_text: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout_secs = settings.api_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(&settings.api_base_url, Duration::from_secs(timeout_secs))
    }

    fn url(&self, path: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("bad base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    async fn send(&self, req: reqwest::RequestBuilder, endpoint: &str) -> Result<Value, ApiError> {
        let res = req.send().await.map_err(|err| {
            tracing::warn!(%endpoint, error = %err, "backend request failed");
            self.unreachable(err)
        })?;

        let status = res.status();
        let text = res.text().await.map_err(|err| self.unreachable(err))?;

        if !status.is_success() {
            tracing::warn!(%endpoint, http_status = %status, "backend returned error status");
            return Err(ApiError::http(status.as_u16(), &text));
        }

        serde_json::from_str::<Value>(&text).map_err(|err| ApiError::Decode {
            endpoint: endpoint.to_string(),
            detail: err.to_string(),
        })
    }

    fn unreachable(&self, err: reqwest::Error) -> ApiError {
        ApiError::Unreachable {
            base_url: self.base_url_text.clone(),
            detail: err.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url_text
    }

    async fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.url(path)?;
        let endpoint = url.path().to_string();
        tracing::debug!(%endpoint, "GET backend");
        self.send(self.http.get(url).query(query), &endpoint).await
    }

    async fn post(&self, path: &[&str], body: &Value) -> Result<Value, ApiError> {
        let url = self.url(path)?;
        let endpoint = url.path().to_string();
        tracing::debug!(%endpoint, "POST backend");
        self.send(self.http.post(url).json(body), &endpoint).await
    }
}
