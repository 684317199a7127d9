use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_HOSTS_URL, DEFAULT_PAGE_SIZE, DEFAULT_PLATFORM_PROBE_PATH};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Survey configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Candidate hosts
    pub hosts_url: String,
    pub hosts_file: Option<PathBuf>,

    // Oldest-post snapshot
    pub snapshot_path: PathBuf,

    // Remote API access
    pub api_scheme: String,
    pub request_timeout: Duration,
    pub page_size: usize,
    pub platform_probe_path: String,

    // Throughput sampler
    pub speed_snapshot_path: PathBuf,
    pub speed_history_dir: PathBuf,
    pub speed_min_posts: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Candidate hosts
            hosts_url: env_or_default("HOSTS_URL", DEFAULT_HOSTS_URL),
            hosts_file: optional_env("HOSTS_FILE").map(PathBuf::from),

            // Oldest-post snapshot
            snapshot_path: PathBuf::from(env_or_default(
                "SNAPSHOT_PATH",
                "./data/instance-first-toot.json",
            )),

            // Remote API access
            api_scheme: env_or_default("API_SCHEME", "https"),
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),
            page_size: parse_env_usize("PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            platform_probe_path: env_or_default(
                "PLATFORM_PROBE_PATH",
                DEFAULT_PLATFORM_PROBE_PATH,
            ),

            // Throughput sampler
            speed_snapshot_path: PathBuf::from(env_or_default(
                "SPEED_SNAPSHOT_PATH",
                "./data/instance-speed.json",
            )),
            speed_history_dir: PathBuf::from(env_or_default(
                "SPEED_HISTORY_DIR",
                "./data/instance-speed-history",
            )),
            speed_min_posts: parse_env_usize("SPEED_MIN_POSTS", 40)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size < 2 {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_SIZE".to_string(),
                message: "must be at least 2".to_string(),
            });
        }
        if self.speed_min_posts < 2 {
            return Err(ConfigError::InvalidValue {
                name: "SPEED_MIN_POSTS".to_string(),
                message: "must be at least 2".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !matches!(self.api_scheme.as_str(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "API_SCHEME".to_string(),
                message: format!("must be 'http' or 'https', got '{}'", self.api_scheme),
            });
        }
        if !self.platform_probe_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                name: "PLATFORM_PROBE_PATH".to_string(),
                message: "must start with '/'".to_string(),
            });
        }
        if self.hosts_file.is_none() {
            if let Err(e) = url::Url::parse(&self.hosts_url) {
                return Err(ConfigError::InvalidValue {
                    name: "HOSTS_URL".to_string(),
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Configuration with every field populated, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            hosts_url: DEFAULT_HOSTS_URL.to_string(),
            hosts_file: None,
            snapshot_path: PathBuf::from("./data/instance-first-toot.json"),
            api_scheme: "http".to_string(),
            request_timeout: Duration::from_secs(5),
            page_size: DEFAULT_PAGE_SIZE,
            platform_probe_path: DEFAULT_PLATFORM_PROBE_PATH.to_string(),
            speed_snapshot_path: PathBuf::from("./data/instance-speed.json"),
            speed_history_dir: PathBuf::from("./data/instance-speed-history"),
            speed_min_posts: 40,
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
