use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from environment variables or TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the order and customer export files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Frontend origin for CORS restrictions on the API routes.
    /// If not set, the API allows same-origin only.
    #[serde(default)]
    pub frontend_origin: Option<String>,
    /// Page size applied when a request omits `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    /// Query cache TTL in seconds (default: 60). 0 = no caching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_limit() -> u64 {
    10
}

const fn default_cache_ttl_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            frontend_origin: None,
            default_limit: default_limit(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// Environment variables override file values:
    /// - `SHOPLYTICS_HOST` → host
    /// - `SHOPLYTICS_PORT` → port
    /// - `SHOPLYTICS_DATA_DIR` → data_dir
    /// - `SHOPLYTICS_FRONTEND_ORIGIN` → frontend_origin
    /// - `SHOPLYTICS_DEFAULT_LIMIT` → default_limit
    /// - `SHOPLYTICS_CACHE_TTL` → cache_ttl_secs
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config =
            config_path.map_or_else(Self::default, |path| match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read config file: {e}, using defaults");
                    Self::default()
                }
            });

        // Environment variable overrides
        if let Ok(host) = std::env::var("SHOPLYTICS_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("SHOPLYTICS_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(data_dir) = std::env::var("SHOPLYTICS_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(origin) = std::env::var("SHOPLYTICS_FRONTEND_ORIGIN") {
            config.frontend_origin = Some(origin);
        }
        if let Ok(val) = std::env::var("SHOPLYTICS_DEFAULT_LIMIT") {
            if let Ok(l) = val.parse::<u64>() {
                if l > 0 {
                    config.default_limit = l;
                }
            }
        }
        if let Ok(val) = std::env::var("SHOPLYTICS_CACHE_TTL") {
            if let Ok(t) = val.parse() {
                config.cache_ttl_secs = t;
            }
        }

        config
    }

    /// Path to the order export file.
    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join("orders.json")
    }

    /// Path to the customer export file.
    pub fn customers_path(&self) -> PathBuf {
        self.data_dir.join("customers.json")
    }
}
