//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/waypost/config.toml)
//! 3. Environment variables (WAYPOST_* prefix)
//!
//! Environment variables take precedence over config file values. The
//! server binary applies its command-line flags on top of the result.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable prefix
const ENV_PREFIX: &str = "WAYPOST";

/// Which storage backend holds the records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Lost on restart
    #[default]
    Memory,
    /// `data_dir/waypost.db`
    Sqlite,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => bail!("Unknown backend '{}': expected 'memory' or 'sqlite'", other),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => f.write_str("memory"),
            BackendKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Storage backend
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory for the SQLite database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (WAYPOST_HOST, WAYPOST_PORT, WAYPOST_BACKEND, WAYPOST_DATA_DIR)
    /// 2. Config file (~/.config/waypost/config.toml or WAYPOST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            config.apply_env_overrides();
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::load_from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from TOML text, then apply env overrides
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Unparseable values are logged and ignored.
    fn apply_env_overrides(&mut self) {
        // WAYPOST_HOST
        if let Ok(val) = std::env::var(format!("{}_HOST", ENV_PREFIX)) {
            if !val.is_empty() {
                self.host = val;
            }
        }

        // WAYPOST_PORT
        if let Ok(val) = std::env::var(format!("{}_PORT", ENV_PREFIX)) {
            match val.parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!("Invalid {}_PORT value '{}': {}", ENV_PREFIX, val, e),
            }
        }

        // WAYPOST_BACKEND
        if let Ok(val) = std::env::var(format!("{}_BACKEND", ENV_PREFIX)) {
            match val.parse() {
                Ok(backend) => self.backend = backend,
                Err(e) => warn!("Invalid {}_BACKEND value: {}", ENV_PREFIX, e),
            }
        }

        // WAYPOST_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }
    }

    /// Get the config file path
    ///
    /// Can be overridden with WAYPOST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("waypost")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("waypost.db")
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("waypost")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "WAYPOST_HOST",
        "WAYPOST_PORT",
        "WAYPOST_BACKEND",
        "WAYPOST_DATA_DIR",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.backend, BackendKind::Memory);
        assert!(config.data_dir.ends_with("waypost"));
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_sqlite_path() {
        let config = Config::default();
        assert!(config.sqlite_path().ends_with("waypost.db"));
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!("SQLite".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert!("mongo".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_env_override_port() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("WAYPOST_PORT", "8081");
        config.apply_env_overrides();
        assert_eq!(config.port, 8081);

        // Garbage is ignored
        env::set_var("WAYPOST_PORT", "not-a-port");
        config.apply_env_overrides();
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn test_env_override_backend_and_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("WAYPOST_BACKEND", "sqlite");
        env::set_var("WAYPOST_DATA_DIR", "/tmp/waypost-test");
        config.apply_env_overrides();

        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/waypost-test/waypost.db"));
    }

    #[test]
    fn test_env_override_host() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("WAYPOST_HOST", "127.0.0.1");
        config.apply_env_overrides();
        assert_eq!(config.host, "127.0.0.1");

        // Empty string keeps the current value
        env::set_var("WAYPOST_HOST", "");
        config.apply_env_overrides();
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            port = 7000
            backend = "sqlite"
            data_dir = "/custom/data"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
    }

    #[test]
    fn test_load_from_str_rejects_unknown_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        assert!(Config::load_from_str(r#"backend = "mongo""#).is_err());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.backend, BackendKind::Memory);
    }

    #[test]
    fn test_load_from_path_reads_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "host = \"127.0.0.1\"\nport = 6000\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:6000");
    }
}
