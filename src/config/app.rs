// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Development fallback used when no signing secret is configured.
pub const DEV_SECRET: &str = "your-super-secret-key-change-in-production";

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub embedding: EmbeddingConfig,
    pub catalog: CatalogConfig,
    pub readiness: ReadinessConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Option<u64>,
    pub version: String,
}

#[derive(Deserialize, Clone, Serialize)]
pub struct AuthConfig {
    pub secret: Option<String>,
    pub algorithm: String,
    pub token_ttl_minutes: i64,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub users_file: Option<String>,
}

// Secrets are never printed.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("algorithm", &self.algorithm)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "***"))
            .field("users_file", &self.users_file)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct EmbeddingConfig {
    pub dim: usize,
    pub max_input_chars: usize,
    pub max_batch_size: usize,
    pub default_chunk_size: i64,
    pub default_overlap: i64,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct CatalogConfig {
    pub model_dir: String,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct ReadinessConfig {
    pub mode: String,
    pub database_path: String,
    pub index_dir: String,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct MonitoringConfig {
    pub metrics_enabled: bool,
    pub log_level: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            timeout: Some(30),
            version: "0.0.0".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: "HS256".to_string(),
            token_ttl_minutes: 30,
            admin_username: "admin".to_string(),
            admin_password: None,
            users_file: Some("data/users.json".to_string()),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dim: 8,
            max_input_chars: 20_000,
            max_batch_size: 1000,
            default_chunk_size: 512,
            default_overlap: 0,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            model_dir: "models".to_string(),
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            mode: "local".to_string(),
            database_path: "data/db.sqlite".to_string(),
            index_dir: "data/indexes".to_string(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            log_level: Some("info".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            embedding: EmbeddingConfig::default(),
            catalog: CatalogConfig::default(),
            readiness: ReadinessConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

/// Flat environment variables that predate the `PETRA_` prefix, mapped onto
/// their config keys. Later entries win, so `AUTH_SECRET` beats `SECRET`.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("SECRET", "auth.secret"),
    ("AUTH_SECRET", "auth.secret"),
    ("ADMIN_USERNAME", "auth.admin_username"),
    ("ADMIN_PASSWORD", "auth.admin_password"),
    ("USERS_FILE", "auth.users_file"),
    ("EMBED_DIM", "embedding.dim"),
    ("EMBED_MAX_CHARS", "embedding.max_input_chars"),
    ("MODEL_DIR", "catalog.model_dir"),
    ("MODE", "readiness.mode"),
    ("DATABASE_PATH", "readiness.database_path"),
    ("INDEX_DIR", "readiness.index_dir"),
    ("VERSION", "server.version"),
    ("METRICS_ENABLED", "monitoring.metrics_enabled"),
];

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
    legacy_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: "PETRA".to_string(),
            legacy_env: true,
        }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip the unprefixed variables; used where the process environment
    /// must not leak into the result.
    pub fn without_legacy_env(mut self) -> Self {
        self.legacy_env = false;
        self
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = config::Config::builder();

        config = config.set_default("server.host", "0.0.0.0")?;
        config = config.set_default("server.port", 8000)?;
        config = config.set_default("server.timeout", 30)?;
        config = config.set_default("server.version", "0.0.0")?;

        config = config.set_default("auth.algorithm", "HS256")?;
        config = config.set_default("auth.token_ttl_minutes", 30)?;
        config = config.set_default("auth.admin_username", "admin")?;
        config = config.set_default("auth.users_file", "data/users.json")?;

        config = config.set_default("embedding.dim", 8)?;
        config = config.set_default("embedding.max_input_chars", 20_000)?;
        config = config.set_default("embedding.max_batch_size", 1000)?;
        config = config.set_default("embedding.default_chunk_size", 512)?;
        config = config.set_default("embedding.default_overlap", 0)?;

        config = config.set_default("catalog.model_dir", "models")?;

        config = config.set_default("readiness.mode", "local")?;
        config = config.set_default("readiness.database_path", "data/db.sqlite")?;
        config = config.set_default("readiness.index_dir", "data/indexes")?;

        config = config.set_default("monitoring.metrics_enabled", false)?;
        config = config.set_default("monitoring.log_level", "info")?;

        if let Some(path) = &self.config_path {
            if path.exists() {
                config = config.add_source(config::File::from(path.as_path()));
            }
        } else {
            let default_config = PathBuf::from("config.toml");
            if default_config.exists() {
                config = config.add_source(config::File::with_name("config"));
            }
        }

        config = config.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .ignore_empty(true),
        );

        if self.legacy_env {
            for (var, key) in LEGACY_ENV_KEYS {
                let value = std::env::var(var).ok().filter(|v| !v.is_empty());
                if let Some(value) = value {
                    config = config.set_override(*key, value)?;
                }
            }
        }

        let loaded: AppConfig = config.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Message(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Message(e.to_string())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        ConfigLoader::new().load()
    }

    pub fn load_with_path<P: Into<PathBuf>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        ConfigLoader::new().with_config_path(path).load()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "auth.token_ttl_minutes must be positive".to_string(),
            ));
        }
        if self.embedding.max_batch_size == 0 {
            return Err(ConfigError::Message(
                "embedding.max_batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Signing secret, falling back to the development secret.
    pub fn signing_secret(&self) -> String {
        match self.auth.secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                tracing::warn!("No signing secret configured, using the development secret");
                DEV_SECRET.to_string()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigLoader::new()
            .with_config_path("/nonexistent/petra.toml")
            .with_env_prefix("PETRA_TEST_DEFAULTS")
            .without_legacy_env()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.algorithm, "HS256");
        assert_eq!(config.auth.token_ttl_minutes, 30);
        assert_eq!(config.auth.admin_username, "admin");
        assert!(config.auth.admin_password.is_none());
        assert_eq!(config.embedding.dim, 8);
        assert_eq!(config.embedding.max_input_chars, 20_000);
        assert_eq!(config.catalog.model_dir, "models");
        assert_eq!(config.readiness.mode, "local");
        assert!(!config.monitoring.metrics_enabled);
    }

    #[test]
    fn test_file_source_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[embedding]\ndim = 16\n\n[auth]\nadmin_username = \"root\"\n"
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_config_path(file.path())
            .with_env_prefix("PETRA_TEST_FILE")
            .without_legacy_env()
            .load()
            .unwrap();

        assert_eq!(config.embedding.dim, 16);
        assert_eq!(config.auth.admin_username, "root");
        assert_eq!(config.embedding.max_input_chars, 20_000);
    }

    #[test]
    fn test_invalid_ttl_rejected() {
        let mut file: NamedTempFile = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[auth]\ntoken_ttl_minutes = 0\n").unwrap();

        let result = ConfigLoader::new()
            .with_config_path(file.path())
            .with_env_prefix("PETRA_TEST_TTL")
            .without_legacy_env()
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_signing_secret_fallback() {
        let mut config = AppConfig::default();
        assert_eq!(config.signing_secret(), DEV_SECRET);

        config.auth.secret = Some("configured".to_string());
        assert_eq!(config.signing_secret(), "configured");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut config = AppConfig::default();
        config.auth.secret = Some("top-secret".to_string());
        config.auth.admin_password = Some("hunter2".to_string());

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_toml_rendering() {
        let rendered = AppConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("[embedding]"));
        assert!(rendered.contains("dim = 8"));
    }
}
