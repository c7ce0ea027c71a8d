//! Configuration management for the ERPNext client
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! the environment (`ERPNEXT_URL`, `ERPNEXT_API_KEY`, `ERPNEXT_API_SECRET`).

pub mod credentials;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub use credentials::{resolve_session_credentials, resolve_token_credentials};

/// Default ERPNext instance (local docker setup)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub const ENV_URL: &str = "ERPNEXT_URL";
pub const ENV_API_KEY: &str = "ERPNEXT_API_KEY";
pub const ENV_API_SECRET: &str = "ERPNEXT_API_SECRET";

/// Behaviour knobs for [`ErpNextClient`](crate::ErpNextClient).
///
/// Durations are stored in milliseconds so the YAML form stays readable.
/// camelCase aliases are accepted for every option that has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Maximum number of resubmissions after the initial attempt
    #[serde(alias = "retryAttempts")]
    pub retry_attempts: u32,

    /// Base backoff unit; retry `n` waits `n * retry_delay_ms`
    #[serde(alias = "retryDelay")]
    pub retry_delay_ms: u64,

    /// Cache GET responses in memory
    #[serde(alias = "enableCache")]
    pub enable_cache: bool,

    /// Time-to-live of cached GET responses
    #[serde(alias = "cacheTimeout")]
    pub cache_timeout_ms: u64,

    /// Maximum admissions per rolling 60 second window (unlimited when unset)
    #[serde(alias = "rateLimitPerMinute", skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_minute: Option<u32>,

    /// Per-request network timeout
    pub timeout_ms: u64,

    /// Write the security and request audit logs
    pub audit_enabled: bool,

    /// Directory holding the audit logs (current directory when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_dir: Option<PathBuf>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay_ms: 1000,
            enable_cache: false,
            cache_timeout_ms: 5 * 60 * 1000,
            rate_limit_per_minute: None,
            timeout_ms: 30_000,
            audit_enabled: true,
            audit_dir: None,
        }
    }
}

impl ClientOptions {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject option combinations the client cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_per_minute == Some(0) {
            return Err(ConfigError::Invalid(
                "rate_limit_per_minute must be at least 1".to_string(),
            )
            .into());
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".to_string()).into());
        }
        Ok(())
    }
}

/// Resolved client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// ERPNext base URL, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key for token authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API secret for token authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,

    #[serde(default)]
    pub options: ClientOptions,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_secret: None,
            options: ClientOptions::default(),
        }
    }
}

/// Strip trailing slashes so endpoints can be appended verbatim.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl Config {
    /// Get the default config file path (`~/.erpnext/config.yaml`)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".erpnext").join("config.yaml"))
    }

    /// Load configuration, layering the file (if any) and then the environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(Path::new(p))?,
            None => {
                let default = Self::default_path()?;
                if default.exists() {
                    Self::load_from(&default)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_with(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::Invalid(format!(
                "Configuration file not found: {}",
                path.display()
            ))
            .into());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.base_url = normalize_base_url(&config.base_url);

        Ok(config)
    }

    /// Overlay environment values. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_URL) {
            self.base_url = normalize_base_url(&url);
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(secret) = non_empty(ENV_API_SECRET) {
            self.api_secret = Some(secret);
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Credentials live in this file; keep it private
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert_eq!(options.retry_attempts, 3);
        assert_eq!(options.retry_delay(), Duration::from_secs(1));
        assert!(!options.enable_cache);
        assert_eq!(options.cache_timeout(), Duration::from_secs(300));
        assert_eq!(options.rate_limit_per_minute, None);
        assert_eq!(options.timeout(), Duration::from_secs(30));
        assert!(options.audit_enabled);
    }

    #[test]
    fn test_options_accept_camel_case_names() {
        let yaml = "retryAttempts: 5\nretryDelay: 250\nenableCache: true\ncacheTimeout: 1000\nrateLimitPerMinute: 30\n";
        let options: ClientOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.retry_attempts, 5);
        assert_eq!(options.retry_delay_ms, 250);
        assert!(options.enable_cache);
        assert_eq!(options.cache_timeout_ms, 1000);
        assert_eq!(options.rate_limit_per_minute, Some(30));
        // Unspecified fields keep their defaults
        assert_eq!(options.timeout_ms, 30_000);
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let options = ClientOptions {
            rate_limit_per_minute: Some(0),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let options = ClientOptions {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
        assert!(ClientOptions::default().validate().is_ok());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://erp.example.com/"),
            "https://erp.example.com"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080"),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            api_key: Some("file-key".to_string()),
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://erp.example.com/"),
            (ENV_API_KEY, "env-key"),
            (ENV_API_SECRET, ""),
        ]
        .into_iter()
        .collect();

        config.apply_env_with(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.base_url, "https://erp.example.com");
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        // Empty values do not count as configured
        assert!(config.api_secret.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.yaml");
        let config = Config {
            base_url: "https://erp.example.com".to_string(),
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            options: ClientOptions {
                enable_cache: true,
                rate_limit_per_minute: Some(10),
                ..Default::default()
            },
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded.base_url, config.base_url);
        assert_eq!(loaded.api_key, config.api_key);
        assert_eq!(loaded.options, config.options);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope.yaml");
        assert!(Config::load_from(&missing).is_err());
    }
}
