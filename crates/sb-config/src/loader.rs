//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "shiftboard.toml",
    "./config/config.toml",
    "/etc/shiftboard/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_env_overrides(&mut config, |key| env::var(key).ok());

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured file does not exist, searching defaults");
        }

        if let Ok(path) = env::var("SHIFTBOARD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `SHIFTBOARD_*` overrides read through `lookup`.
///
/// Unparsable numeric or boolean values are ignored and the previous value kept.
pub(crate) fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("SHIFTBOARD_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("SHIFTBOARD_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("SHIFTBOARD_CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // MongoDB
    if let Some(val) = lookup("SHIFTBOARD_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("SHIFTBOARD_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Store
    if let Some(val) = lookup("SHIFTBOARD_STORE_BACKEND") {
        match val.parse() {
            Ok(backend) => config.store.backend = backend,
            Err(e) => warn!(error = %e, "Ignoring SHIFTBOARD_STORE_BACKEND"),
        }
    }
    if let Some(attempts) = lookup("SHIFTBOARD_CAS_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
        config.store.cas_max_attempts = attempts;
    }

    // Auth
    if let Some(val) = lookup("SHIFTBOARD_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = lookup("SHIFTBOARD_JWT_ISSUER") {
        config.auth.issuer = val;
    }
    if let Some(expiry) = lookup("SHIFTBOARD_TOKEN_EXPIRY_SECS").and_then(|v| v.parse().ok()) {
        config.auth.token_expiry_secs = expiry;
    }
    if let Some(allow) = lookup("SHIFTBOARD_ALLOW_PRIVILEGED_REGISTRATION").and_then(|v| v.parse().ok()) {
        config.auth.allow_privileged_self_registration = allow;
    }

    // Seed
    if let Some(val) = lookup("SHIFTBOARD_SEED_ADMIN_USERNAME") {
        config.seed.admin_username = val;
    }
    if let Some(val) = lookup("SHIFTBOARD_SEED_ADMIN_PASSWORD") {
        config.seed.admin_password = val;
    }

    // General
    if let Some(val) = lookup("SHIFTBOARD_DEV_MODE") {
        config.dev_mode = val == "true" || val == "1";
    }
}
