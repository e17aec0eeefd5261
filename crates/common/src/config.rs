//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Email configuration (optional; notifications are skipped when absent).
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
    /// Site name shown in emails.
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Email delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Delivery provider: "smtp", "sendgrid" or "mailgun".
    pub provider: String,
    /// From address.
    pub from_address: String,
    /// From display name.
    #[serde(default = "default_site_name")]
    pub from_name: String,
    /// SMTP host (smtp provider).
    #[serde(default)]
    pub smtp_host: Option<String>,
    /// SMTP port (smtp provider).
    #[serde(default)]
    pub smtp_port: Option<u16>,
    /// SMTP username (smtp provider).
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password (smtp provider).
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// API key (sendgrid/mailgun providers).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sending domain (mailgun provider).
    #[serde(default)]
    pub domain: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_site_name() -> String {
    "FindColoc".to_string()
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `FINDCOLOC_ENV`)
    /// 3. Environment variables with `FINDCOLOC_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("FINDCOLOC_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FINDCOLOC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FINDCOLOC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
