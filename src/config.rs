// ⚙️ Configuration - endpoints, headers and fetch limits
//
// Loaded from TOML. Every field has a default, so an empty file (or no file
// at all) gives a working configuration for the Arizona reporting API.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Environment variable consulted when no config path is given
pub const CONFIG_ENV: &str = "CAMPAIGN_FINANCE_CONFIG";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Explicit path first, then $CAMPAIGN_FINANCE_CONFIG, then defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            info!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = Path::new(&path);
                info!(path = %path.display(), "loading config from {}", CONFIG_ENV);
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Remote table API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub aggregate_path: String,
    pub detail_path: String,

    /// Sent with every request
    pub headers: BTreeMap<String, String>,

    /// Base form body; `start` and `length` are overridden per page
    pub form: BTreeMap<String, String>,

    /// Rows requested per page
    pub page_length: u64,

    /// Stop after this many rows per query (None = until the source runs out)
    pub max_rows: Option<u64>,

    pub max_retries: u32,

    /// Aggregate paging gives up after this many failed pages in a row
    pub max_page_failures: u32,

    pub backoff_ms: u64,
    pub max_backoff_ms: u64,

    /// Concurrent detail requests
    pub concurrency: usize,

    pub request_timeout_secs: u64,
}

impl FetchConfig {
    pub fn aggregate_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.aggregate_path)
    }

    pub fn detail_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.detail_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based), doubling up to the cap
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(20);
        let ms = self.backoff_ms.saturating_mul(factor).min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        let headers = [
            ("accept", "application/json, text/javascript, */*; q=0.01"),
            ("accept-language", "en-US,en;q=0.7"),
            ("origin", "https://seethemoney.az.gov"),
            ("referer", "https://seethemoney.az.gov/Reporting/Explore"),
            ("x-requested-with", "XMLHttpRequest"),
        ];
        let form = [
            ("draw", "2"),
            ("order[0][column]", "0"),
            ("order[0][dir]", "asc"),
            ("start", "0"),
            ("length", "500000"),
            ("search[value]", ""),
            ("search[regex]", "false"),
        ];

        FetchConfig {
            base_url: "https://seethemoney.az.gov".to_string(),
            aggregate_path: "/Reporting/GetNEWTableData/".to_string(),
            detail_path: "/Reporting/GetNEWDetailedTableData/".to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            page_length: 500_000,
            max_rows: None,
            max_retries: 3,
            max_page_failures: 3,
            backoff_ms: 500,
            max_backoff_ms: 8_000,
            concurrency: 8,
            request_timeout_secs: 60,
        }
    }
}
