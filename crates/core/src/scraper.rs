//! Trigger for the awards scraper service.
//!
//! The scraper runs for minutes after it is kicked off, so callers only learn whether
//! the request was accepted. Every failure other than "already running" is reported as
//! a started refresh and logged; the next awards search shows whether it worked.

use crate::config::Settings;
use crate::domain::status::{ScrapeOutcome, ScrapeRequest};
use anyhow::Context;
use serde_json::Value;
use std::time::Duration;

pub const STARTED_MESSAGE: &str =
    "Awards data update started. New awards will appear in search results shortly.";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ScraperClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScraperClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scraper http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout_secs = settings.api_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(settings.scraper_url(), Duration::from_secs(timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn trigger(&self, req: &ScrapeRequest) -> ScrapeOutcome {
        let url = format!("{}/scrape", self.base_url);
        tracing::info!(pages = req.pages, force_run = req.force_run, "triggering awards scraper");

        let res = match self.http.post(&url).json(req).send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::warn!(%url, error = %err, "scraper request failed");
                return started();
            }
        };

        let status = res.status();
        let body = match res.text().await {
            Ok(text) => serde_json::from_str::<Value>(&text).ok(),
            Err(err) => {
                tracing::warn!(%url, error = %err, "failed to read scraper response");
                None
            }
        };

        interpret(status.as_u16(), body.as_ref(), req.force_run)
    }
}

/// Maps a scraper answer to what the user is told.
pub fn interpret(http_status: u16, body: Option<&Value>, force_run: bool) -> ScrapeOutcome {
    let parsed: ScrapeOutcome = body
        .and_then(|b| serde_json::from_value(b.clone()).ok())
        .unwrap_or_default();

    if parsed.status == "error" && parsed.message.contains("already running") {
        let since = parsed.last_run.as_deref().unwrap_or("recently");
        let hint = if force_run {
            "Force run attempted."
        } else {
            "Use force run to override."
        };
        return ScrapeOutcome {
            status: "running".to_string(),
            message: format!("Scraper is already running since {since}. {hint}"),
            running: parsed.running,
            last_run: parsed.last_run,
        };
    }

    let ok = (200..300).contains(&http_status) && parsed.status != "error";
    if !ok {
        tracing::warn!(
            http_status,
            status = %parsed.status,
            message = %parsed.message,
            "scraper reported a failure"
        );
        return started();
    }

    ScrapeOutcome {
        status: if parsed.status.is_empty() {
            "success".to_string()
        } else {
            parsed.status
        },
        message: if parsed.message.trim().is_empty() {
            STARTED_MESSAGE.to_string()
        } else {
            parsed.message
        },
        running: parsed.running,
        last_run: parsed.last_run,
    }
}

fn started() -> ScrapeOutcome {
    ScrapeOutcome {
        status: "success".to_string(),
        message: STARTED_MESSAGE.to_string(),
        running: None,
        last_run: None,
    }
}
