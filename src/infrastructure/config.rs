//! Configuration infrastructure
//!
//! Settings are layered: compiled defaults, then `config/default.toml`
//! (optional), then the file named by `SITEMAP_SCOUT_CONFIG` (optional),
//! then environment variables such as `SITEMAP_SCOUT__SCRAPING__TEST_MODE`.

#![allow(clippy::uninlined_format_args)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::infrastructure::parsing::config::ProductPageSelectors;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub scraping: ScrapingConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Client identity and timeouts used by every outbound request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Desktop browser identity sent with product page requests
    pub browser_user_agent: String,

    /// Generic identity sent when reading robots.txt and probing sitemap paths
    pub robots_user_agent: String,

    /// Identity sent when downloading sitemap documents
    pub sitemap_user_agent: String,

    /// Timeout for page and sitemap GET requests
    pub request_timeout_secs: u64,

    /// Timeout for the robots.txt GET during discovery
    pub robots_timeout_secs: u64,

    /// Timeout for the HEAD existence probes
    pub probe_timeout_secs: u64,

    pub follow_redirects: bool,
}

/// Scrape batch behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Fixed pause after each product page request
    pub request_delay_ms: u64,

    /// Only scrape the first `test_mode_limit` product URLs
    pub test_mode: bool,

    pub test_mode_limit: usize,

    /// Number of records echoed back in the scrape response
    pub preview_limit: usize,

    /// Per-field CSS selector fallbacks
    pub selectors: ProductPageSelectors,
}

/// Persistence sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Fixed CSV file rewritten after every successful scrape
    pub csv_path: PathBuf,

    /// Optional JSON dump of the same records
    pub json_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for the rolling log file
    pub log_dir: PathBuf,

    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

/// Default configuration values
pub mod defaults {
    pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    pub const ROBOTS_USER_AGENT: &str = "Mozilla/5.0";
    pub const SITEMAP_USER_AGENT: &str = "Mozilla/5.0 (compatible; SitemapBot/1.0)";

    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const ROBOTS_TIMEOUT_SECS: u64 = 10;
    pub const PROBE_TIMEOUT_SECS: u64 = 8;

    /// Delay between product page requests in milliseconds
    pub const REQUEST_DELAY_MS: u64 = 500;
    pub const TEST_MODE: bool = true;
    pub const TEST_MODE_LIMIT: usize = 10;
    pub const PREVIEW_LIMIT: usize = 10;

    pub const CSV_PATH: &str = "products.csv";
    pub const LISTEN_ADDR: &str = "127.0.0.1:5000";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_DIR: &str = "logs";
    pub const LOG_FILE_NAME: &str = "sitemap-scout.log";
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            browser_user_agent: defaults::BROWSER_USER_AGENT.to_string(),
            robots_user_agent: defaults::ROBOTS_USER_AGENT.to_string(),
            sitemap_user_agent: defaults::SITEMAP_USER_AGENT.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            robots_timeout_secs: defaults::ROBOTS_TIMEOUT_SECS,
            probe_timeout_secs: defaults::PROBE_TIMEOUT_SECS,
            follow_redirects: true,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            test_mode: defaults::TEST_MODE,
            test_mode_limit: defaults::TEST_MODE_LIMIT,
            preview_limit: defaults::PREVIEW_LIMIT,
            selectors: ProductPageSelectors::default(),
        }
    }
}

impl ScrapingConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Cap applied to the product URL list, `None` when test mode is off
    pub fn url_limit(&self) -> Option<usize> {
        self.test_mode.then_some(self.test_mode_limit)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(defaults::CSV_PATH),
            json_path: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: defaults::LISTEN_ADDR.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let module_filters = [
            ("reqwest", "info"),
            ("hyper", "warn"),
            ("h2", "warn"),
            ("tower_http", "info"),
            ("html5ever", "warn"),
            ("selectors", "warn"),
        ]
        .into_iter()
        .map(|(module, level)| (module.to_string(), level.to_string()))
        .collect();

        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from(defaults::LOG_DIR),
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters,
        }
    }
}

impl AppConfig {
    /// Reject settings that would make every request or scrape meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secs) in [
            ("http.request_timeout_secs", self.http.request_timeout_secs),
            ("http.robots_timeout_secs", self.http.robots_timeout_secs),
            ("http.probe_timeout_secs", self.http.probe_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Validation {
                    message: format!("{} must be greater than 0", name),
                });
            }
        }

        if self.scraping.test_mode && self.scraping.test_mode_limit == 0 {
            return Err(ConfigError::Validation {
                message: "scraping.test_mode_limit must be greater than 0 in test mode".to_string(),
            });
        }

        for (field, selectors) in self.scraping.selectors.fields() {
            if selectors.is_empty() {
                return Err(ConfigError::Validation {
                    message: format!("scraping.selectors.{} must list at least one selector", field),
                });
            }
        }

        Ok(())
    }
}

/// Configuration loader for the layered sources
pub struct ConfigManager {
    pub base_path: PathBuf,
    pub override_path: Option<PathBuf>,
}

impl ConfigManager {
    pub const ENV_PREFIX: &'static str = "SITEMAP_SCOUT";
    pub const OVERRIDE_ENV: &'static str = "SITEMAP_SCOUT_CONFIG";

    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("config/default.toml"),
            override_path: std::env::var_os(Self::OVERRIDE_ENV).map(PathBuf::from),
        }
    }

    pub fn with_paths(base_path: impl Into<PathBuf>, override_path: Option<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            override_path,
        }
    }

    /// Load and validate the configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let defaults = config::Config::try_from(&AppConfig::default())?;

        let mut builder = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(self.base_path.clone()).required(false));

        if let Some(path) = &self.override_path {
            builder = builder.add_source(config::File::from(path.clone()).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;

        info!(
            "Configuration loaded (base: {:?}, override: {:?})",
            self.base_path, self.override_path
        );
        Ok(app_config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
