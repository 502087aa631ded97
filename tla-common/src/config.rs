//! Configuration loading and resolution
//!
//! Every setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TLA_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never prevents startup: a warning is logged and
//! the remaining tiers are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::{Error, Result};

/// Key substituted when no Gemini API key is configured; requests made with it
/// fail and take the narrative fallback path
pub const PLACEHOLDER_API_KEY: &str = "dummy_key_to_prevent_crash";

pub const ENV_HOST: &str = "TLA_HOST";
pub const ENV_PORT: &str = "TLA_PORT";
pub const ENV_LOG_LEVEL: &str = "TLA_LOG_LEVEL";
pub const ENV_GEMINI_API_KEY: &str = "TLA_GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "TLA_GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "TLA_GEMINI_BASE_URL";
pub const ENV_SUBMISSION_WEBHOOK_URL: &str = "TLA_SUBMISSION_WEBHOOK_URL";
pub const ENV_RESULTS_WEBHOOK_URL: &str = "TLA_RESULTS_WEBHOOK_URL";
pub const ENV_BOOKING_URL: &str = "TLA_BOOKING_URL";
pub const ENV_ANALYZING_MIN_DELAY_MS: &str = "TLA_ANALYZING_MIN_DELAY_MS";

/// Compiled defaults
pub struct CompiledDefaults;

impl CompiledDefaults {
    pub const HOST: &'static str = "127.0.0.1";
    pub const PORT: u16 = 5740;
    pub const LOG_LEVEL: &'static str = "info";
    pub const GEMINI_MODEL: &'static str = "gemini-2.0-flash";
    pub const GEMINI_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    pub const SUBMISSION_WEBHOOK_URL: &'static str = "https://services.leadconnectorhq.com/hooks/YaalPPYLvgFNpGoyTfuq/webhook-trigger/0780fbcf-5ef2-46fa-96dc-74750232412e";
    pub const RESULTS_WEBHOOK_URL: &'static str = "https://services.leadconnectorhq.com/hooks/YaalPPYLvgFNpGoyTfuq/webhook-trigger/a7737ad2-fcb6-4fd7-8570-f7e92fe7d4cb";
    pub const BOOKING_URL: &'static str = "https://api.uconnect.com.au/widget/booking/pb8doRop5EzwHZXUVx4t";
    pub const ANALYZING_MIN_DELAY_MS: u64 = 2000;
    pub const EVENT_CAPACITY: usize = 100;
}

/// On-disk TOML configuration (every field optional)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub booking_url: Option<String>,
    pub analyzing_min_delay_ms: Option<u64>,
    pub logging: LoggingConfig,
    pub gemini: GeminiConfig,
    pub webhooks: WebhookConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub submission_url: Option<String>,
    pub results_url: Option<String>,
    pub send_results: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub enabled: Option<bool>,
    pub event_capacity: Option<usize>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub gemini: GeminiSettings,
    pub webhooks: WebhookSettings,
    pub booking_url: String,
    pub analyzing_min_delay: Duration,
    pub analytics_enabled: bool,
    pub event_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    /// False when the placeholder key was substituted
    pub api_key_configured: bool,
    pub model: String,
    pub base_url: String,
}

/// Webhook endpoints; `None` disables the corresponding notification
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub submission_url: Option<String>,
    pub results_url: Option<String>,
}

impl Settings {
    /// Resolve settings from CLI → ENV → TOML → compiled defaults
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Self {
        let host = cli
            .host
            .clone()
            .or_else(|| env_string(ENV_HOST))
            .or_else(|| toml.host.clone())
            .unwrap_or_else(|| CompiledDefaults::HOST.to_string());

        let port = cli
            .port
            .or_else(|| env_parsed(ENV_PORT))
            .or(toml.port)
            .unwrap_or(CompiledDefaults::PORT);

        let log_level = cli
            .log_level
            .clone()
            .or_else(|| env_string(ENV_LOG_LEVEL))
            .or_else(|| toml.logging.level.clone())
            .unwrap_or_else(|| CompiledDefaults::LOG_LEVEL.to_string());

        let (api_key, api_key_configured) = resolve_gemini_api_key(toml);

        let gemini = GeminiSettings {
            api_key,
            api_key_configured,
            model: env_string(ENV_GEMINI_MODEL)
                .or_else(|| toml.gemini.model.clone())
                .unwrap_or_else(|| CompiledDefaults::GEMINI_MODEL.to_string()),
            base_url: env_string(ENV_GEMINI_BASE_URL)
                .or_else(|| toml.gemini.base_url.clone())
                .unwrap_or_else(|| CompiledDefaults::GEMINI_BASE_URL.to_string()),
        };

        let submission_url = env_string(ENV_SUBMISSION_WEBHOOK_URL)
            .or_else(|| toml.webhooks.submission_url.clone())
            .unwrap_or_else(|| CompiledDefaults::SUBMISSION_WEBHOOK_URL.to_string());

        let results_url = env_string(ENV_RESULTS_WEBHOOK_URL)
            .or_else(|| toml.webhooks.results_url.clone())
            .unwrap_or_else(|| CompiledDefaults::RESULTS_WEBHOOK_URL.to_string());
        let send_results = toml.webhooks.send_results.unwrap_or(true);

        let webhooks = WebhookSettings {
            submission_url: non_blank(submission_url),
            results_url: if send_results { non_blank(results_url) } else { None },
        };

        let booking_url = env_string(ENV_BOOKING_URL)
            .or_else(|| toml.booking_url.clone())
            .unwrap_or_else(|| CompiledDefaults::BOOKING_URL.to_string());

        let delay_ms = env_parsed(ENV_ANALYZING_MIN_DELAY_MS)
            .or(toml.analyzing_min_delay_ms)
            .unwrap_or(CompiledDefaults::ANALYZING_MIN_DELAY_MS);

        // A broadcast channel needs room for at least one event
        let event_capacity = match toml.analytics.event_capacity {
            Some(0) => {
                warn!(
                    "analytics.event_capacity must be at least 1, using {}",
                    CompiledDefaults::EVENT_CAPACITY
                );
                CompiledDefaults::EVENT_CAPACITY
            }
            Some(capacity) => capacity,
            None => CompiledDefaults::EVENT_CAPACITY,
        };

        Self {
            host,
            port,
            log_level,
            gemini,
            webhooks,
            booking_url,
            analyzing_min_delay: Duration::from_millis(delay_ms),
            analytics_enabled: toml.analytics.enabled.unwrap_or(true),
            event_capacity,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: CompiledDefaults::HOST.to_string(),
            port: CompiledDefaults::PORT,
            log_level: CompiledDefaults::LOG_LEVEL.to_string(),
            gemini: GeminiSettings {
                api_key: PLACEHOLDER_API_KEY.to_string(),
                api_key_configured: false,
                model: CompiledDefaults::GEMINI_MODEL.to_string(),
                base_url: CompiledDefaults::GEMINI_BASE_URL.to_string(),
            },
            webhooks: WebhookSettings {
                submission_url: Some(CompiledDefaults::SUBMISSION_WEBHOOK_URL.to_string()),
                results_url: Some(CompiledDefaults::RESULTS_WEBHOOK_URL.to_string()),
            },
            booking_url: CompiledDefaults::BOOKING_URL.to_string(),
            analyzing_min_delay: Duration::from_millis(CompiledDefaults::ANALYZING_MIN_DELAY_MS),
            analytics_enabled: true,
            event_capacity: CompiledDefaults::EVENT_CAPACITY,
        }
    }
}

/// Resolve the Gemini API key from ENV → TOML
///
/// Returns the placeholder (and `false`) when neither source holds a usable key.
/// A missing key is logged but never fatal.
pub fn resolve_gemini_api_key(toml: &TomlConfig) -> (String, bool) {
    if let Some(key) = env_string(ENV_GEMINI_API_KEY).filter(|k| is_valid_key(k)) {
        info!("Gemini API key loaded from environment variable");
        return (key, true);
    }

    if let Some(key) = toml.gemini.api_key.as_ref().filter(|k| is_valid_key(k)) {
        info!("Gemini API key loaded from TOML config");
        return (key.clone(), true);
    }

    error!(
        "Gemini API key is missing! Set {} or gemini.api_key in the TOML config. \
         Narrative requests will use fallback content.",
        ENV_GEMINI_API_KEY
    );
    (PLACEHOLDER_API_KEY.to_string(), false)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Default TOML location: `~/.config/tla/tla-audit.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tla").join("tla-audit.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load the TOML config, degrading to defaults when absent or invalid
///
/// An explicitly requested path that cannot be loaded is logged at WARN; a missing
/// file at the default location is expected and only noted at INFO.
pub fn load_toml_config_or_default(explicit: Option<&Path>) -> TomlConfig {
    let (path, explicit) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => {
                warn!("Could not determine config directory, using defaults");
                return TomlConfig::default();
            }
        },
    };

    if !path.exists() {
        if explicit {
            warn!("Config file not found: {} (using defaults)", path.display());
        } else {
            info!("No config file at {} (using defaults)", path.display());
        }
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{} (using defaults)", e);
            TomlConfig::default()
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_string(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
