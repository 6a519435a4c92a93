//! Configuration management for the trip planner
//!
//! Handles loading configuration from files and environment variables,
//! filling credentials from the conventional API key variables, and
//! validating the non-credential settings.

use crate::TripPlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the trip planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripPlannerConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Places search API settings
    #[serde(default)]
    pub places: PlacesConfig,
    /// Language model settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Outbound messaging settings
    #[serde(default)]
    pub messaging: MessagingConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Google Places text search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Places API key (falls back to `GOOGLE_MAPS_API_KEY`)
    pub api_key: Option<String>,
    /// Base URL of the Maps web services
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Number of places listed per category
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (falls back to `PERPLEXITY_API_KEY`)
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible chat completions API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
}

/// Twilio WhatsApp settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Account SID (falls back to `TWILIO_ACCOUNT_SID`)
    pub account_sid: Option<String>,
    /// Auth token (falls back to `TWILIO_AUTH_TOKEN`)
    pub auth_token: Option<String>,
    /// Sender identity, e.g. `whatsapp:+14155238886` (falls back to `TWILIO_WHATSAPP_NUMBER`)
    pub from: Option<String>,
    /// Recipient identity (falls back to `USER_WHATSAPP_NUMBER`)
    pub to: Option<String>,
    /// Base URL of the Twilio REST API
    #[serde(default = "default_messaging_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum characters per outbound message
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8501
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_top_n() -> usize {
    5
}

fn default_llm_base_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_llm_model() -> String {
    "sonar-pro".to_string()
}

fn default_llm_timeout() -> u32 {
    120
}

fn default_messaging_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_max_chunk_chars() -> usize {
    1500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            timeout_seconds: default_timeout(),
            top_n: default_top_n(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from: None,
            to: None,
            base_url: default_messaging_base_url(),
            timeout_seconds: default_timeout(),
            max_chunk_chars: default_max_chunk_chars(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TripPlannerConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPPLANNER_LLM__MODEL=sonar overrides llm.model
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_credentials(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Fill credentials left unset by the file and prefixed variables from
    /// the conventional variable names.
    pub fn apply_env_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, name: &str| {
            if slot.as_deref().is_none_or(str::is_empty) {
                if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                    *slot = Some(value);
                }
            }
        };

        fill(&mut self.places.api_key, "GOOGLE_MAPS_API_KEY");
        fill(&mut self.llm.api_key, "PERPLEXITY_API_KEY");
        fill(&mut self.messaging.account_sid, "TWILIO_ACCOUNT_SID");
        fill(&mut self.messaging.auth_token, "TWILIO_AUTH_TOKEN");
        fill(&mut self.messaging.from, "TWILIO_WHATSAPP_NUMBER");
        fill(&mut self.messaging.to, "USER_WHATSAPP_NUMBER");
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
        if self.places.base_url.is_empty() {
            self.places.base_url = default_places_base_url();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_timeout();
        }
        if self.places.top_n == 0 {
            self.places.top_n = default_top_n();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.messaging.base_url.is_empty() {
            self.messaging.base_url = default_messaging_base_url();
        }
        if self.messaging.timeout_seconds == 0 {
            self.messaging.timeout_seconds = default_timeout();
        }
        if self.messaging.max_chunk_chars == 0 {
            self.messaging.max_chunk_chars = default_max_chunk_chars();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings.
    ///
    /// Credentials are not checked here; a missing key surfaces when the
    /// corresponding service is first called.
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Places", self.places.timeout_seconds),
            ("LLM", self.llm.timeout_seconds),
            ("Messaging", self.messaging.timeout_seconds),
        ] {
            if timeout > 600 {
                return Err(TripPlannerError::config(format!(
                    "{name} API timeout cannot exceed 600 seconds"
                ))
                .into());
            }
        }

        // Places text search returns at most 20 results per page
        if self.places.top_n > 20 {
            return Err(TripPlannerError::config("Places top_n cannot exceed 20").into());
        }

        if self.messaging.max_chunk_chars > 1600 {
            return Err(TripPlannerError::config(
                "Message chunk size cannot exceed 1600 characters",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Places", &self.places.base_url),
            ("LLM", &self.llm.base_url),
            ("Messaging", &self.messaging.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TripPlannerConfig::default();
        assert_eq!(config.places.base_url, "https://maps.googleapis.com/maps/api");
        assert_eq!(config.places.top_n, 5);
        assert_eq!(config.llm.model, "sonar-pro");
        assert_eq!(config.messaging.max_chunk_chars, 1500);
        assert_eq!(config.logging.level, "info");
        assert!(config.places.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_are_not_validated() {
        let config = TripPlannerConfig::default();
        assert!(config.messaging.account_sid.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_credentials_fill_unset_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GOOGLE_MAPS_API_KEY", "maps-key"),
            ("PERPLEXITY_API_KEY", "pplx-key"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_WHATSAPP_NUMBER", "whatsapp:+14155238886"),
            ("USER_WHATSAPP_NUMBER", "whatsapp:+919800000000"),
        ]);

        let mut config = TripPlannerConfig::default();
        config.llm.api_key = Some("from-file".to_string());
        config.apply_env_credentials(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.places.api_key.as_deref(), Some("maps-key"));
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.messaging.account_sid.as_deref(), Some("AC123"));
        assert_eq!(config.messaging.auth_token.as_deref(), Some("secret"));
        assert_eq!(
            config.messaging.from.as_deref(),
            Some("whatsapp:+14155238886")
        );
        assert_eq!(config.messaging.to.as_deref(), Some("whatsapp:+919800000000"));
    }

    #[test]
    fn test_empty_env_credential_is_ignored() {
        let mut config = TripPlannerConfig::default();
        config.apply_env_credentials(|_| Some(String::new()));
        assert!(config.places.api_key.is_none());
    }

    #[test]
    fn test_apply_defaults_repairs_zero_values() {
        let mut config = TripPlannerConfig::default();
        config.places.top_n = 0;
        config.messaging.max_chunk_chars = 0;
        config.llm.model = String::new();
        config.apply_defaults();
        assert_eq!(config.places.top_n, 5);
        assert_eq!(config.messaging.max_chunk_chars, 1500);
        assert_eq!(config.llm.model, "sonar-pro");
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripPlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripPlannerConfig::default();
        config.llm.timeout_seconds = 900;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_base_url() {
        let mut config = TripPlannerConfig::default();
        config.messaging.base_url = "ftp://api.twilio.com".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Messaging API base URL"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("tripplanner-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[places]\ntop_n = 3\n\n[llm]\nmodel = \"sonar\"\n"
        )
        .unwrap();

        let config = TripPlannerConfig::load_from_path(Some(path.clone())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.places.top_n, 3);
        assert_eq!(config.llm.model, "sonar");
        assert_eq!(config.messaging.max_chunk_chars, 1500);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_path_generation() {
        let path = TripPlannerConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("tripplanner"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
