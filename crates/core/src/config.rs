//! Configuration management
//!
//! Settings come from three layers: an optional TOML file at
//! ~/.config/clip/config.toml, environment variables, and command-line flags.
//! The CLI collapses them once at startup into an immutable [`ClientConfig`]
//! that is passed by reference to everything else.
//!
//! The API token is never stored in the file.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default host of the notes API
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port of the notes API
pub const DEFAULT_API_PORT: u16 = 41184;

/// Body the notes API returns from `/ping`
pub const DEFAULT_IDENTITY: &str = "JoplinClipperServer";

/// Default Chrome remote debugging port
pub const DEFAULT_BROWSER_PORT: u16 = 9222;

const DEFAULT_PING_TIMEOUT_MS: u64 = 3000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
const DEFAULT_EVAL_TIMEOUT_MS: u64 = 30000;

/// On-disk settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Notes API settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Browser DevTools settings
    #[serde(default)]
    pub browser: BrowserSettings,
}

/// Notes API section of the settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Exact body expected from the liveness check
    #[serde(default = "default_identity")]
    pub identity: String,

    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_ms: u64,
}

/// Browser section of the settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_browser_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Whole-request limit for `/json/*` calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Limit on waiting for a `Runtime.evaluate` reply
    #[serde(default = "default_eval_timeout")]
    pub eval_timeout_ms: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_identity() -> String {
    DEFAULT_IDENTITY.to_string()
}

fn default_ping_timeout() -> u64 {
    DEFAULT_PING_TIMEOUT_MS
}

fn default_browser_port() -> u16 {
    DEFAULT_BROWSER_PORT
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_eval_timeout() -> u64 {
    DEFAULT_EVAL_TIMEOUT_MS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_api_port(),
            identity: default_identity(),
            ping_timeout_ms: default_ping_timeout(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_browser_port(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            eval_timeout_ms: default_eval_timeout(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            api: ApiSettings::default(),
            browser: BrowserSettings::default(),
        }
    }
}

/// Configuration manager handles locating and loading the settings file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("clip").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager rooted at a specific directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_path: dir.into().join("config.toml"),
        }
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load settings from disk
    ///
    /// If the file doesn't exist, returns the default settings.
    pub fn load(&self) -> Result<Settings> {
        if !self.config_path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut settings: Settings = toml::from_str(&content)?;

        if settings.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade clip.",
                settings.schema_version, SCHEMA_VERSION
            )));
        }
        settings.schema_version = SCHEMA_VERSION;

        Ok(settings)
    }
}

/// API token. Debug output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Values supplied by flags or environment; `None` falls through to the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token: Option<String>,
    pub browser_host: Option<String>,
    pub browser_port: Option<u16>,
}

/// Browser DevTools endpoint configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub eval_timeout: Duration,
}

impl BrowserConfig {
    /// Base URL of the DevTools HTTP endpoint
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}:{}", self.host, self.port))?)
    }
}

/// Immutable configuration for one invocation
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub token: Option<Credential>,
    pub identity: String,
    pub ping_timeout: Duration,
    pub browser: BrowserConfig,
}

impl ClientConfig {
    /// Merge file settings with flag/environment overrides
    pub fn resolve(settings: Settings, overrides: Overrides) -> Self {
        let token = overrides
            .token
            .filter(|t| !t.trim().is_empty())
            .map(Credential::new);

        Self {
            host: overrides.host.unwrap_or(settings.api.host),
            port: overrides.port.unwrap_or(settings.api.port),
            token,
            identity: settings.api.identity,
            ping_timeout: Duration::from_millis(settings.api.ping_timeout_ms),
            browser: BrowserConfig {
                host: overrides.browser_host.unwrap_or(settings.browser.host),
                port: overrides.browser_port.unwrap_or(settings.browser.port),
                connect_timeout: Duration::from_millis(settings.browser.connect_timeout_ms),
                request_timeout: Duration::from_millis(settings.browser.request_timeout_ms),
                eval_timeout: Duration::from_millis(settings.browser.eval_timeout_ms),
            },
        }
    }

    /// Base URL of the notes API
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}:{}", self.host, self.port))?)
    }

    /// The token, or `MissingCredential` when none was supplied
    pub fn credential(&self) -> Result<&Credential> {
        self.token.as_ref().ok_or(Error::MissingCredential)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(Settings::default(), Overrides::default())
    }
}
