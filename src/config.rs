//! Environment-based configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    /// Allowed CORS origins; empty means any origin.
    pub cors_origins: Vec<String>,
    pub room: RoomConfig,
    pub transport: TransportConfig,
    pub log_level: String,
}

/// Room lifecycle settings
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Empty rooms older than this are reclaimed by the sweep.
    pub idle_timeout_minutes: u64,
    pub cleanup_interval_secs: u64,
}

impl RoomConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

/// Transport limits
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub max_message_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: parse_or(&lookup, "PORT", 5502),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty() && *s != "*")
                .map(str::to_string)
                .collect(),
            room: RoomConfig {
                idle_timeout_minutes: parse_or(&lookup, "ROOM_IDLE_TIMEOUT_MINUTES", 30),
                cleanup_interval_secs: parse_or(&lookup, "ROOM_CLEANUP_INTERVAL_SECS", 300),
            },
            transport: TransportConfig {
                max_message_bytes: parse_or(&lookup, "MAX_MESSAGE_BYTES", 64 * 1024),
            },
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
