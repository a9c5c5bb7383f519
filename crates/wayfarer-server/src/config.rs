//! Configuration loading and typed config structures for the catalog server.
//!
//! The configuration lives in `wayfarer.yaml`. Every key is optional; a
//! missing file means all defaults. After parsing, a fixed set of
//! `WAYFARER_*` environment variables override individual values so
//! secrets (geocoder key, admin password) never have to live in the file.
//!
//! Geocoding and authentication are disabled unless their secrets are set.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wayfarer.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WayfarerConfig {
    /// Listener and public URL.
    #[serde(default)]
    pub server: ServerSettings,

    /// Where documents and assets live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Address to coordinates lookup.
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Admin credentials for the write endpoints.
    #[serde(default)]
    pub auth: AuthConfig,

    /// HTML allow-list for rich-text fields.
    #[serde(default)]
    pub sanitizer: SanitizerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WayfarerConfig {
    /// Load configuration from a YAML file, apply environment overrides and
    /// validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment overrides
    /// and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults. Environment
    /// overrides apply either way.
    ///
    /// # Errors
    ///
    /// Same as [`WayfarerConfig::from_file`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// - `WAYFARER_HOST` overrides `server.host`
    /// - `WAYFARER_PORT` overrides `server.port`
    /// - `WAYFARER_PUBLIC_URL` overrides `server.public_url`
    /// - `WAYFARER_DATA_DIR` overrides `storage.data_dir`
    /// - `WAYFARER_GEOCODER_KEY` overrides `geocoding.api_key`
    /// - `WAYFARER_ADMIN_USERNAME` overrides `auth.username`
    /// - `WAYFARER_ADMIN_PASSWORD` overrides `auth.password`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// A `WAYFARER_PORT` that is not a valid port is ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("WAYFARER_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("WAYFARER_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "ignoring invalid WAYFARER_PORT"),
            }
        }
        if let Some(val) = lookup("WAYFARER_PUBLIC_URL") {
            self.server.public_url = Some(val);
        }
        if let Some(val) = lookup("WAYFARER_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("WAYFARER_GEOCODER_KEY") {
            self.geocoding.api_key = Some(val);
        }
        if let Some(val) = lookup("WAYFARER_ADMIN_USERNAME") {
            self.auth.username = Some(val);
        }
        if let Some(val) = lookup("WAYFARER_ADMIN_PASSWORD") {
            self.auth.password = Some(val);
        }
    }

    /// Check values that parse fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(public_url) = self.server.public_url.as_deref() {
            let parsed = Url::parse(public_url).map_err(|e| {
                ConfigError::Invalid(format!("server.public_url {public_url:?}: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "server.public_url must be http or https, got {public_url:?}"
                )));
            }
        }
        if self.geocoding.api_key.is_some() {
            Url::parse(&self.geocoding.endpoint).map_err(|e| {
                ConfigError::Invalid(format!("geocoding.endpoint {:?}: {e}", self.geocoding.endpoint))
            })?;
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(String::from(
                "server.max_upload_bytes must be positive",
            )));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally visible base URL used for asset links. When unset, links
    /// are built from the request's `Host` header.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Largest accepted upload body in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding `attractions/` and `routes.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Directory holding one subdirectory per attraction.
    pub fn attractions_dir(&self) -> PathBuf {
        self.data_dir.join("attractions")
    }

    /// The routes array file.
    pub fn routes_file(&self) -> PathBuf {
        self.data_dir.join("routes.json")
    }
}

/// Geocoding service settings (`AMap` web service API).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeocodingConfig {
    /// Geocode endpoint URL.
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,

    /// API key. Geocoding is disabled when absent.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in milliseconds.
    #[serde(default = "default_geocoding_timeout_ms")]
    pub timeout_ms: u64,

    /// City used to narrow down ambiguous addresses.
    #[serde(default = "default_geocoding_city")]
    pub city: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoding_endpoint(),
            api_key: None,
            timeout_ms: default_geocoding_timeout_ms(),
            city: default_geocoding_city(),
        }
    }
}

/// Admin credentials. Write endpoints are open when either is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    /// Admin user name.
    #[serde(default)]
    pub username: Option<String>,

    /// Admin password.
    #[serde(default)]
    pub password: Option<String>,
}

/// HTML allow-list applied to `description` and `description_en`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SanitizerConfig {
    /// Tags kept in rich text.
    #[serde(default = "default_allowed_tags")]
    pub allowed_tags: Vec<String>,

    /// Attributes kept on any allowed tag.
    #[serde(default = "default_allowed_attributes")]
    pub allowed_attributes: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            allowed_tags: default_allowed_tags(),
            allowed_attributes: default_allowed_attributes(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn,
    /// error, or a full filter directive).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_geocoding_endpoint() -> String {
    "https://restapi.amap.com/v3/geocode/geo".to_owned()
}

const fn default_geocoding_timeout_ms() -> u64 {
    3_000
}

#[allow(clippy::unnecessary_wraps)]
fn default_geocoding_city() -> Option<String> {
    Some("上海".to_owned())
}

fn default_allowed_tags() -> Vec<String> {
    [
        "p", "br", "b", "i", "strong", "em", "u", "s", "a", "ul", "ol", "li", "img", "h1", "h2",
        "h3", "h4", "blockquote", "code", "pre",
    ]
    .iter()
    .map(|t| (*t).to_owned())
    .collect()
}

fn default_allowed_attributes() -> Vec<String> {
    ["href", "src", "alt", "title"]
        .iter()
        .map(|a| (*a).to_owned())
        .collect()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "text".to_owned()
}
