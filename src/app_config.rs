/*!
 * Application configuration module.
 *
 * Configuration is environment-driven: a `.env` file (when present) is
 * loaded first without overwriting variables already set in the process
 * environment, then `Config::from_env` reads and validates everything the
 * service needs. Missing required variables fail startup with a clear
 * message rather than failing the first request.
 */

use anyhow::{Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};

use crate::locale_utils::is_known_language_subtag;

/// Log level wrapper for config/CLI
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the `log` crate's level filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// CMS (Contentstack) collaborator configuration
#[derive(Debug, Clone)]
pub struct ContentstackConfig {
    /// Management API base URL
    pub cma_base_url: String,
    /// Delivery API base URL
    pub cda_base_url: String,
    /// Stack API key
    pub api_key: String,
    /// Management token (draft reads, writes)
    pub management_token: String,
    /// Delivery token (published reads)
    pub delivery_token: String,
    /// Publishing environment the published snapshot is read from
    pub environment: String,
    /// Workflow stage the entry is advanced to after localization
    pub review_stage_uid: String,
}

/// Translation provider (Smartling) configuration
#[derive(Debug, Clone)]
pub struct SmartlingConfig {
    /// API base URL
    pub base_url: String,
    /// Auth user identifier
    pub user_identifier: String,
    /// Auth user secret
    pub user_secret: String,
    /// Account uid used in the MT endpoint path
    pub account_uid: String,
    /// Explicit source locale id; when unset the webhook locale is used
    pub source_locale_id: Option<String>,
    /// Target locale ids to translate into; empty disables translation
    pub target_locale_ids: Vec<String>,
    /// Optional URL notified after each locale completes (best-effort)
    pub callback_url: Option<String>,
}

/// Represents the full service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Timeout applied to every outbound HTTP call, in milliseconds
    pub http_timeout_ms: u64,
    /// Maximum length of payloads echoed into the logs
    pub log_truncate_max: usize,
    /// CMS collaborator settings
    pub contentstack: ContentstackConfig,
    /// Translation provider settings
    pub smartling: SmartlingConfig,
}

impl Config {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let smartling = SmartlingConfig {
            base_url: trim_base_url(&get_env("SMARTLING_BASE_URL").unwrap_or_else(default_smartling_base_url)),
            user_identifier: require_env("SMARTLING_USER_IDENTIFIER")?,
            user_secret: require_env("SMARTLING_USER_SECRET")?,
            account_uid: require_env("SMARTLING_ACCOUNT_UID")?,
            source_locale_id: get_env("SMARTLING_SOURCE_LOCALE_ID"),
            target_locale_ids: parse_csv(&get_env("SMARTLING_TARGET_LOCALE_IDS").unwrap_or_default()),
            callback_url: get_env("SMARTLING_CALLBACK_URL"),
        };

        for locale in &smartling.target_locale_ids {
            if !is_known_language_subtag(locale) {
                warn!("Target locale '{}' has an unrecognized language subtag", locale);
            }
        }

        Ok(Self {
            port: get_env_int("PORT", 3000, 1, u16::MAX as i64) as u16,
            log_level: get_env("LOG_LEVEL")
                .and_then(|s| s.parse::<LogLevel>().ok())
                .unwrap_or_default(),
            http_timeout_ms: get_env_int("HTTP_TIMEOUT_MS", 15_000, 1_000, i64::MAX) as u64,
            log_truncate_max: get_env_int("LOG_TRUNCATE_MAX", 20_000, 1_000, i64::MAX) as usize,
            contentstack: ContentstackConfig {
                cma_base_url: trim_base_url(
                    &get_env("CONTENTSTACK_CMA_BASE_URL").unwrap_or_else(default_cma_base_url),
                ),
                cda_base_url: trim_base_url(
                    &get_env("CONTENTSTACK_CDA_BASE_URL").unwrap_or_else(default_cda_base_url),
                ),
                api_key: require_env("CONTENTSTACK_API_KEY")?,
                management_token: require_env("CONTENTSTACK_MANAGEMENT_TOKEN")?,
                delivery_token: require_env("CONTENTSTACK_DELIVERY_TOKEN")?,
                environment: require_env("CONTENTSTACK_ENVIRONMENT")?,
                review_stage_uid: require_env("CONTENTSTACK_TRANSLATION_REVIEW_STAGE_UID")?,
            },
            smartling,
        })
    }

    /// Load a `.env` file into the environment without overwriting
    /// already-set variables. The file is optional.
    pub fn load_dotenv(path: &str) {
        let _ = dotenvy::from_filename(path);
    }
}

impl Default for Config {
    /// Placeholder configuration for tests; no network credentials.
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: LogLevel::Info,
            http_timeout_ms: 15_000,
            log_truncate_max: 20_000,
            contentstack: ContentstackConfig {
                cma_base_url: default_cma_base_url(),
                cda_base_url: default_cda_base_url(),
                api_key: String::new(),
                management_token: String::new(),
                delivery_token: String::new(),
                environment: "production".to_string(),
                review_stage_uid: "stage_translation_review".to_string(),
            },
            smartling: SmartlingConfig {
                base_url: default_smartling_base_url(),
                user_identifier: String::new(),
                user_secret: String::new(),
                account_uid: String::new(),
                source_locale_id: None,
                target_locale_ids: Vec::new(),
                callback_url: None,
            },
        }
    }
}

/// Read an environment variable, treating blank values as unset.
pub fn get_env(name: &str) -> Option<String> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Read a required environment variable.
pub fn require_env(name: &str) -> Result<String> {
    get_env(name).ok_or_else(|| anyhow!("Missing required env var: {}", name))
}

/// Read an integer environment variable, falling back to the default when
/// the value is missing, unparsable, or outside `[min, max]`.
pub fn get_env_int(name: &str, default: i64, min: i64, max: i64) -> i64 {
    match get_env(name).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n >= min && n <= max => n,
        _ => default,
    }
}

/// Split a comma-separated value into trimmed, non-empty entries.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn default_cma_base_url() -> String {
    "https://api.contentstack.io".to_string()
}

fn default_cda_base_url() -> String {
    "https://cdn.contentstack.io".to_string()
}

fn default_smartling_base_url() -> String {
    "https://api.smartling.com".to_string()
}
