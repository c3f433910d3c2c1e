use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Loaded from the TOML file named by `SAIGON_ADMIN_CONFIG`. Every section
// and field has a default, so a missing file or an empty one boots a local
// instance on 127.0.0.1:8080.
//
// ============================================================================

pub const CONFIG_ENV: &str = "SAIGON_ADMIN_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.message().to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LiveConfig {
    /// Events buffered per subscriber before it starts skipping
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Start with the default shop lifecycle instead of an empty catalog
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

/// First administrator account, registered at boot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_channel_capacity() -> usize {
    256
}

fn default_true() -> bool {
    true
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_admin_email() -> String {
    "admin@saigonsteps.vn".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self { channel_capacity: default_channel_capacity() }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { seed_defaults: true }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self { admin_name: default_admin_name(), admin_email: default_admin_email() }
    }
}

impl AppConfig {
    /// Reads the file named by `SAIGON_ADMIN_CONFIG`, or falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path),
            Err(_) => {
                tracing::info!("{} not set, using default configuration", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = contents.parse()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Validation("Server host cannot be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Server port cannot be 0".into()));
        }
        if self.live.channel_capacity == 0 {
            return Err(ConfigError::Validation("Live channel capacity must be at least 1".into()));
        }
        if !self.bootstrap.admin_email.contains('@') {
            return Err(ConfigError::Validation(format!(
                "Invalid administrator email: {}",
                self.bootstrap.admin_email
            )));
        }
        Ok(())
    }
}

impl FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
