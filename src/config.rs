use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub semantic: SemanticSettings,
    /// Absent section disables the one-time SMS entirely
    #[serde(default)]
    pub sms: Option<SmsSettings>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> String {
    "database.csv".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_shortlist_size")]
    pub shortlist_size: usize,
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,
    /// Seeker-facing timezone; Pacific standard time by default
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            shortlist_size: default_shortlist_size(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

fn default_shortlist_size() -> usize {
    3
}
fn default_oracle_timeout_secs() -> u64 {
    10
}
fn default_utc_offset_hours() -> i32 {
    -8
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_session_capacity")]
    pub capacity: u64,
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            capacity: default_session_capacity(),
            ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_session_capacity() -> u64 {
    1000
}
fn default_session_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            api_key: String::new(),
        }
    }
}

fn default_geocoding_base_url() -> String {
    "http://api.openweathermap.org".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SemanticSettings {
    #[serde(default = "default_semantic_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_semantic_model")]
    pub model: String,
}

impl Default for SemanticSettings {
    fn default() -> Self {
        Self {
            base_url: default_semantic_base_url(),
            api_key: String::new(),
            model: default_semantic_model(),
        }
    }
}

fn default_semantic_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_semantic_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsSettings {
    #[serde(default = "default_sms_base_url")]
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    #[serde(default = "default_sms_from_number")]
    pub from_number: String,
}

fn default_sms_base_url() -> String {
    "https://api.twilio.com".to_string()
}
fn default_sms_from_number() -> String {
    "+15107212356".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with SHELTER_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g. SHELTER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SHELTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_credential_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SHELTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Overlay credentials from their conventional environment variables
///
/// Deployments set OPENWEATHER_API_KEY, OPENAI_API_KEY, and the Twilio
/// pair directly; these take precedence over file values.
fn apply_credential_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(key) = env::var("OPENWEATHER_API_KEY") {
        builder = builder.set_override("geocoding.api_key", key)?;
    }
    if let Ok(key) = env::var("OPENAI_API_KEY") {
        builder = builder.set_override("semantic.api_key", key)?;
    }
    if let Ok(sid) = env::var("TWILIO_ACCOUNT_SID") {
        builder = builder.set_override("sms.account_sid", sid)?;
    }
    if let Ok(token) = env::var("TWILIO_AUTH_TOKEN") {
        builder = builder.set_override("sms.auth_token", token)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching_settings() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.shortlist_size, 3);
        assert_eq!(matching.oracle_timeout_secs, 10);
        assert_eq!(matching.utc_offset_hours, -8);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_sms_disabled_by_default() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert!(settings.sms.is_none());
    }
}
