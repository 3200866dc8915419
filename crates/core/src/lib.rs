pub mod analysis;
pub mod cache;
pub mod chart;
pub mod client;
pub mod domain;
pub mod format;
pub mod scraper;
pub mod search;
pub mod vendors;
pub mod view;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    pub const DEFAULT_SCRAPER_URL: &str =
        "https://nyc-procurement-scraper-3863265067.us-east1.run.app";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub api_timeout_secs: Option<u64>,
        pub scraper_url: Option<String>,
        pub simulated_history_seed: Option<u64>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let api_timeout_secs = match std::env::var("PROCUREMENT_API_TIMEOUT_SECS") {
                Ok(s) => Some(
                    s.trim()
                        .parse::<u64>()
                        .with_context(|| format!("invalid PROCUREMENT_API_TIMEOUT_SECS: {s}"))?,
                ),
                Err(_) => None,
            };

            let simulated_history_seed = match std::env::var("COMPETITOR_SIMULATED_HISTORY") {
                Ok(s) => Some(
                    s.trim()
                        .parse::<u64>()
                        .with_context(|| format!("invalid COMPETITOR_SIMULATED_HISTORY seed: {s}"))?,
                ),
                Err(_) => None,
            };

            Ok(Self {
                api_base_url: std::env::var("PROCUREMENT_API_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                api_timeout_secs,
                scraper_url: std::env::var("SCRAPER_URL").ok(),
                simulated_history_seed,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn scraper_url(&self) -> &str {
            self.scraper_url
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_SCRAPER_URL)
        }

        pub fn history_mode(&self) -> crate::vendors::HistoryMode {
            match self.simulated_history_seed {
                Some(seed) => crate::vendors::HistoryMode::Simulated { seed },
                None => crate::vendors::HistoryMode::Reported,
            }
        }
    }
}
