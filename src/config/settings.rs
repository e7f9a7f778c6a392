//! Extraction settings for ledger-etl
//!
//! Everything the pipeline needs besides the API token: where the API lives,
//! how pages are sized, how retries back off and how records are normalized.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::EtlPaths;
use crate::client::RetryPolicy;
use crate::error::EtlError;
use crate::services::ledger::DEFAULT_MAX_PAGES;

/// User settings for ledger-etl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Base URL of the accounting API (without trailing slash)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Ledger flavour requested from the ledger endpoint
    #[serde(default = "default_ledger_kind")]
    pub ledger_kind: String,

    /// Entries requested per ledger page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on ledger pages requested for one month
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry policy for transient HTTP failures
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Maximum characters kept from an entry's details (0 keeps everything)
    #[serde(default = "default_detail_max_chars")]
    pub detail_max_chars: usize,

    /// Value written to the cost-center column
    #[serde(default = "default_cost_center")]
    pub cost_center_placeholder: String,

    /// Resolve each company's account plan once per run instead of per month
    #[serde(default)]
    pub cache_account_plan: bool,

    /// CSV export of the company directory sheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_file: Option<PathBuf>,

    /// Where exports are written when no output directory is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Indent JSON exports
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    "https://api.clay.cl/v1/contabilidad".to_string()
}

fn default_ledger_kind() -> String {
    "tributario".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_detail_max_chars() -> usize {
    120
}

fn default_cost_center() -> String {
    "N/A".to_string()
}

fn default_pretty_json() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            api_base_url: default_api_base_url(),
            ledger_kind: default_ledger_kind(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryPolicy::default(),
            detail_max_chars: default_detail_max_chars(),
            cost_center_placeholder: default_cost_center(),
            cache_account_plan: false,
            directory_file: None,
            output_dir: None,
            pretty_json: default_pretty_json(),
        }
    }
}

impl Settings {
    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Detail truncation limit, `None` when truncation is disabled
    pub fn detail_limit(&self) -> Option<usize> {
        (self.detail_max_chars > 0).then_some(self.detail_max_chars)
    }

    /// Company directory file, falling back to the default location
    pub fn directory_path(&self, paths: &EtlPaths) -> PathBuf {
        self.directory_file
            .clone()
            .unwrap_or_else(|| paths.directory_file())
    }

    /// Check that the settings describe a usable pipeline
    pub fn validate(&self) -> Result<(), EtlError> {
        if self.api_base_url.trim().is_empty() {
            return Err(EtlError::Config("api_base_url must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(EtlError::Config("page_size must be greater than zero".into()));
        }
        if self.max_pages == 0 {
            return Err(EtlError::Config("max_pages must be greater than zero".into()));
        }
        self.retry.validate()
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &EtlPaths) -> Result<Self, EtlError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| EtlError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| EtlError::Config(format!("Failed to parse settings file: {}", e)))?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &EtlPaths) -> Result<(), EtlError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| EtlError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| EtlError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
