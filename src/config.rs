use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crashgraph: CrashgraphConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// crashgraph-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrashgraphConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CrashgraphConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Graph endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// URL serving the whole dataset as Turtle (Fuseki graph store protocol).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Ontology namespace bound to the `onto:` prefix in every query.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            namespace: default_namespace(),
        }
    }
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:3030/droneCrashWeather/data".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_namespace() -> String {
    "http://ubt/crashedDrones#".to_string()
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in CRASHGRAPH_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (defaults are used when absent)
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config = match std::env::var("CRASHGRAPH_CONFIG") {
            Ok(path) => Self::from_file(PathBuf::from(path))?,
            Err(_) => {
                let path = PathBuf::from("config.toml");
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    log::info!("No config.toml found, using built-in defaults");
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: PathBuf) -> Result<Self> {
        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text without validating it.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Invalid TOML configuration")?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.store.endpoint).with_context(|| {
            format!("store.endpoint is not a valid URL: {}", self.store.endpoint)
        })?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            anyhow::bail!(
                "store.endpoint must use http or https, got '{}'",
                endpoint.scheme()
            );
        }

        if self.store.connect_timeout_secs == 0 {
            anyhow::bail!("store.connect_timeout_secs must be greater than 0");
        }

        if self.store.read_timeout_secs == 0 {
            anyhow::bail!("store.read_timeout_secs must be greater than 0");
        }

        oxigraph::model::NamedNode::new(self.store.namespace.as_str()).with_context(|| {
            format!("store.namespace is not a valid IRI: {}", self.store.namespace)
        })?;
        if !self.store.namespace.ends_with('#') && !self.store.namespace.ends_with('/') {
            anyhow::bail!("store.namespace must end with '#' or '/'");
        }

        if self.http_server.port == 0 {
            anyhow::bail!("http_server.port must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    const TEST_CONFIG: &str = r#"
[crashgraph]
log_level = "debug"

[store]
endpoint = "http://fuseki.internal:3030/droneCrashWeather/data"
connect_timeout_secs = 2
read_timeout_secs = 10

[http_server]
port = 8088
allowed_origins = ["http://localhost:3000"]
"#;

    fn with_config_env(config_path: &std::path::Path, f: impl FnOnce()) {
        let original = std::env::var("CRASHGRAPH_CONFIG").ok();
        std::env::set_var("CRASHGRAPH_CONFIG", config_path.to_str().unwrap());
        f();
        std::env::remove_var("CRASHGRAPH_CONFIG");
        if let Some(val) = original {
            std::env::set_var("CRASHGRAPH_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, TEST_CONFIG).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.crashgraph.log_level, "debug");
            assert_eq!(config.store.connect_timeout(), Duration::from_secs(2));
            assert_eq!(config.store.read_timeout_secs, 10);
            assert_eq!(config.store.namespace, "http://ubt/crashedDrones#");
            assert_eq!(config.http_server.port, 8088);
            assert_eq!(config.http_server.host, "127.0.0.1");
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        with_config_env(&temp_dir.path().join("nonexistent.toml"), || {
            assert!(Config::load().is_err());
        });
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.store.endpoint,
            "http://localhost:3030/droneCrashWeather/data"
        );
        assert_eq!(config.http_server.port, 5000);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.store.read_timeout_secs, 30);
        assert!(config.http_server.allowed_origins.is_empty());
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let config =
            Config::from_toml_str("[store]\nendpoint = \"ftp://example.org/data\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = Config::from_toml_str("[store]\nconnect_timeout_secs = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_namespace_without_separator() {
        let config =
            Config::from_toml_str("[store]\nnamespace = \"http://ubt/crashedDrones\"\n").unwrap();
        assert!(config.validate().is_err());
    }
}
