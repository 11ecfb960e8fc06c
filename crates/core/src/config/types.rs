use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::scheduler::SchedulerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("seatgrab.db")
}

/// Reservation portal configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortalConfig {
    /// Portal origin (scheme and host, no trailing slash needed)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User-Agent header sent on every portal request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://110129.samanpl.ir".to_string()
}

fn default_timeout() -> u64 {
    45
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "seatgrab.db");
        assert_eq!(config.portal.base_url, "https://110129.samanpl.ir");
        assert_eq!(config.portal.timeout_secs, 45);
        assert_eq!(config.scheduler.daily_hour, 7);
    }

    #[test]
    fn test_deserialize_custom_server() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_custom_portal() {
        let toml = r#"
[portal]
base_url = "https://portal.example.ir"
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.portal.base_url, "https://portal.example.ir");
        assert_eq!(config.portal.timeout_secs, 10);
        // Untouched fields keep their defaults
        assert!(config.portal.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_deserialize_custom_database_path() {
        let toml = r#"
[database]
path = "/data/bookings.sqlite"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.database.path.to_str().unwrap(),
            "/data/bookings.sqlite"
        );
    }

    #[test]
    fn test_deserialize_custom_scheduler() {
        let toml = r#"
[scheduler]
daily_hour = 6
daily_minute = 30
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scheduler.daily_hour, 6);
        assert_eq!(config.scheduler.daily_minute, 30);
        assert_eq!(config.scheduler.tick_interval_secs, 60);
    }
}
