use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use donasi_client::StatusEndpoint;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_STATE_FILE: &str = "./.donasi/state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend origin; `/api/v1` is appended by the client.
    pub api_url: String,
    /// Origin the payment provider sends the donor back to.
    pub origin: String,
    pub state_file: PathBuf,
    pub status_endpoint: StatusEndpoint,
    /// Unset means requests wait as long as the transport does.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load `.env` (if present) and read the `DONASI_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let status_endpoint = match read("DONASI_STATUS_ENDPOINT") {
            Some(raw) => raw
                .parse::<StatusEndpoint>()
                .map_err(anyhow::Error::msg)
                .context("Invalid DONASI_STATUS_ENDPOINT")?,
            None => StatusEndpoint::default(),
        };

        let request_timeout = match read("DONASI_REQUEST_TIMEOUT_MS") {
            Some(raw) => {
                let ms = raw
                    .parse::<u64>()
                    .with_context(|| format!("Invalid DONASI_REQUEST_TIMEOUT_MS '{}'", raw))?;
                if ms == 0 {
                    anyhow::bail!("DONASI_REQUEST_TIMEOUT_MS must be greater than zero");
                }
                Some(Duration::from_millis(ms))
            }
            None => None,
        };

        Ok(Self {
            api_url: read("DONASI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            origin: read("DONASI_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            state_file: read("DONASI_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            status_endpoint,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(config.status_endpoint, StatusEndpoint::Notification);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DONASI_API_URL", "https://api.panti.example.org"),
            ("DONASI_ORIGIN", " https://panti.example.org "),
            ("DONASI_STATUS_ENDPOINT", "program-donations"),
            ("DONASI_REQUEST_TIMEOUT_MS", "1500"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://api.panti.example.org");
        assert_eq!(config.origin, "https://panti.example.org");
        assert_eq!(config.status_endpoint, StatusEndpoint::ProgramDonations);
        assert_eq!(config.request_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("DONASI_API_URL", "  ")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("DONASI_STATUS_ENDPOINT", "webhook")]).is_err());
        assert!(config_from(&[("DONASI_REQUEST_TIMEOUT_MS", "soon")]).is_err());
        assert!(config_from(&[("DONASI_REQUEST_TIMEOUT_MS", "0")]).is_err());
    }
}
