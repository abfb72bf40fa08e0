//! ShiftBoard Configuration System
//!
//! TOML-based configuration with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub seed: SeedConfig,

    /// Enable development mode (seeding, relaxed secret checks)
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            mongodb: MongoConfig::default(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            seed: SeedConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "shiftboard".to_string(),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongodb,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown store backend: {}",
                other
            ))),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Attempts for a versioned shift write before giving up
    pub cas_max_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Mongodb,
            cas_max_attempts: 5,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for HS256 session tokens
    pub jwt_secret: String,
    pub issuer: String,
    pub token_expiry_secs: i64,
    /// Allow `/auth/register` to create coordinator/admin/organizer accounts
    pub allow_privileged_self_registration: bool,
    pub password_min_length: usize,
    pub password_max_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: "shiftboard".to_string(),
            token_expiry_secs: 3600, // 1 hour
            allow_privileged_self_registration: false,
            password_min_length: 6,
            password_max_length: 128,
        }
    }
}

/// Development seed data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub sample_shifts: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "DevPassword123!".to_string(),
            sample_shifts: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() && !self.dev_mode {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret must be set outside dev mode".to_string(),
            ));
        }
        if self.auth.token_expiry_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_expiry_secs must be positive".to_string(),
            ));
        }
        if self.auth.password_min_length > self.auth.password_max_length {
            return Err(ConfigError::ValidationError(
                "auth.password_min_length exceeds auth.password_max_length".to_string(),
            ));
        }
        if self.store.cas_max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "store.cas_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# ShiftBoard Configuration
# Environment variables (SHIFTBOARD_*) override these settings

dev_mode = false

[http]
port = 5000
host = "0.0.0.0"
cors_origins = ["http://localhost:3000"]

[mongodb]
uri = "mongodb://localhost:27017"
database = "shiftboard"

[store]
backend = "mongodb"  # mongodb or memory
cas_max_attempts = 5

[auth]
jwt_secret = ""
issuer = "shiftboard"
token_expiry_secs = 3600
allow_privileged_self_registration = false
password_min_length = 6
password_max_length = 128

[seed]
admin_username = "admin"
admin_password = "DevPassword123!"
sample_shifts = true
"#
        .to_string()
    }
}
