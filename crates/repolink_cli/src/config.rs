//! Configuration file support for repolink.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`REPOLINK_DATABASE_URL`, or `REPOLINK_<SECTION>__<KEY>` such as
//!    `REPOLINK_SYNC__WINDOW_SECS`)
//! 3. Config file (~/.config/repolink/config.toml or ./repolink.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/repolink/repolink.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/repolink/repolink.db"  # optional, this is the default
//!
//! [github]
//! api_url = "https://api.github.com"
//! page_size = 100
//! timeout_secs = 10
//! max_attempts = 3
//!
//! [sync]
//! window_secs = 60
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use repolink::github::{DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT, GitHubClientConfig};
use repolink::retry::{DEFAULT_MAX_ATTEMPTS, RetryConfig};
use repolink::sync::DEFAULT_SYNC_WINDOW;
use serde::Deserialize;

const APP_NAME: &str = "repolink";
const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub github: GitHubConfig,
    pub sync: SyncConfig,
    pub server: ServerConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// Upstream API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub page_size: u32,
    pub timeout_secs: u64,
    /// Attempts per page request, including the first.
    pub max_attempts: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Minimum seconds between accepted triggers for one user. Zero disables
    /// the limit.
    pub window_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_SYNC_WINDOW.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Sources are checked in order (later sources override earlier):
    /// 1. ~/.config/repolink/config.toml
    /// 2. ./repolink.toml (local override)
    /// 3. Environment variables (REPOLINK_*)
    ///
    /// Errors fall back to the defaults with a warning rather than aborting.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let local_config = PathBuf::from(format!("{APP_NAME}.toml"));
        if local_config.exists() {
            tracing::debug!("Loading config from ./{APP_NAME}.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // Keys contain underscores, so nesting uses a double underscore:
        // REPOLINK_GITHUB__PAGE_SIZE -> github.page_size
        builder = builder.add_source(
            Environment::with_prefix("REPOLINK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Flat alias for database.url.
        if let Ok(url) = std::env::var("REPOLINK_DATABASE_URL") {
            builder = match builder.set_override("database.url", url) {
                Ok(builder) => builder,
                Err(e) => {
                    tracing::warn!("Ignoring REPOLINK_DATABASE_URL: {e}");
                    return Self::default();
                }
            };
        }

        match builder.build() {
            Ok(settings) => match settings.try_deserialize() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse configuration: {e}, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration: {e}, using defaults");
                Self::default()
            }
        }
    }

    /// Get the database URL, falling back to the XDG state directory.
    pub fn database_url(&self) -> Option<String> {
        if let Some(url) = &self.database.url {
            return Some(url.clone());
        }

        Self::default_state_dir().map(|dir| {
            let db_path = dir.join(format!("{APP_NAME}.db"));
            format!("sqlite://{}?mode=rwc", db_path.display())
        })
    }

    pub fn client_config(&self) -> GitHubClientConfig {
        let defaults = RetryConfig::default();
        GitHubClientConfig {
            api_url: self.github.api_url.clone(),
            page_size: self.github.page_size,
            timeout: Duration::from_secs(self.github.timeout_secs.max(1)),
            retry: RetryConfig {
                max_attempts: self.github.max_attempts.max(1),
                ..defaults
            },
        }
    }

    pub fn sync_window(&self) -> Duration {
        Duration::from_secs(self.sync.window_secs)
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/repolink` or `~/.local/state/repolink`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = from_toml("");

        assert!(config.database.url.is_none());
        assert_eq!(config.github.api_url, DEFAULT_API_URL);
        assert_eq!(config.github.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.github.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.sync_window(), DEFAULT_SYNC_WINDOW);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_full_toml() {
        let config = from_toml(
            r#"
            [database]
            url = "sqlite:///tmp/test.db"

            [github]
            api_url = "http://localhost:9000/"
            page_size = 50
            timeout_secs = 5
            max_attempts = 5

            [sync]
            window_secs = 0

            [server]
            bind = "0.0.0.0:3000"
        "#,
        );

        assert_eq!(config.database_url().as_deref(), Some("sqlite:///tmp/test.db"));
        assert_eq!(config.sync_window(), Duration::ZERO);
        assert_eq!(config.server.bind, "0.0.0.0:3000");

        let client = config.client_config();
        assert_eq!(client.api_url, "http://localhost:9000/");
        assert_eq!(client.page_size, 50);
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.retry.max_attempts, 5);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = from_toml(
            r#"
            [github]
            page_size = 25
        "#,
        );

        assert_eq!(config.github.page_size, 25);
        assert_eq!(config.github.api_url, DEFAULT_API_URL);
        assert_eq!(config.github.timeout_secs, DEFAULT_TIMEOUT.as_secs());
    }

    #[test]
    fn test_client_config_clamps_zero_attempts() {
        let config = from_toml(
            r#"
            [github]
            max_attempts = 0
            timeout_secs = 0
        "#,
        );

        let client = config.client_config();
        assert_eq!(client.retry.max_attempts, 1);
        assert_eq!(client.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_database_url_defaults_to_state_dir() {
        let config = Config::default();
        if let Some(url) = config.database_url() {
            assert!(url.starts_with("sqlite://"));
            assert!(url.ends_with("repolink.db?mode=rwc"));
        }
    }
}
