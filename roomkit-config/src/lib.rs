//! Configuration management for RoomKit services

use serde::Deserialize;
use std::env;

/// Default number of tiles rendered per page
pub const DEFAULT_TILES_PER_PAGE: usize = 6;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Console,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, config::ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "console" | "pretty" => Ok(LogFormat::Console),
            other => Err(config::ConfigError::Message(format!(
                "LOG_FORMAT must be `json` or `console`, got `{}`",
                other
            ))),
        }
    }
}

/// Parameters sent with the join request
#[derive(Debug, Clone, Deserialize)]
pub struct JoinConfig {
    pub room_id: Option<String>,
    pub peer_name: String,
    pub auth_token: Option<String>,
}

/// Tile layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    pub tiles_per_page: usize,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub join: JoinConfig,
    pub layout: LayoutConfig,
    pub log_level: Option<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tiles_per_page = match lookup("TILES_PER_PAGE") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                config::ConfigError::Message(format!("TILES_PER_PAGE: {}", e))
            })?,
            None => DEFAULT_TILES_PER_PAGE,
        };
        if tiles_per_page == 0 {
            return Err(config::ConfigError::Message(
                "TILES_PER_PAGE must be at least 1".to_string(),
            ));
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw)?,
            None => LogFormat::Console,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            join: JoinConfig {
                room_id: lookup("ROOM_ID"),
                peer_name: lookup("PEER_NAME").unwrap_or_else(|| "guest".to_string()),
                auth_token: lookup("AUTH_TOKEN"),
            },
            layout: LayoutConfig { tiles_per_page },
            log_level: Some(log_level),
            log_format,
        })
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.layout.tiles_per_page, DEFAULT_TILES_PER_PAGE);
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.log_format, LogFormat::Console);
        assert_eq!(config.join.peer_name, "guest");
        assert!(config.join.room_id.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TILES_PER_PAGE", "4"),
            ("LOG_FORMAT", "JSON"),
            ("LOG_LEVEL", "debug"),
            ("ROOM_ID", "standup"),
            ("PEER_NAME", "Ada"),
        ]))
        .unwrap();

        assert_eq!(config.layout.tiles_per_page, 4);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.join.room_id.as_deref(), Some("standup"));
        assert_eq!(config.join.peer_name, "Ada");
    }

    #[test]
    fn test_invalid_tiles_per_page() {
        assert!(AppConfig::from_lookup(lookup_from(&[("TILES_PER_PAGE", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("TILES_PER_PAGE", "many")])).is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        assert!(AppConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
