//! Application configuration.
//!
//! Stored with `confy` under the platform config directory as `subsonic-rs`.
//! A missing or unreadable file falls back to the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "subsonic-rs";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    /// JSON library the local service is loaded from
    pub library_file: String,
    /// Window in which a second pointer-down turns a click into a double click
    pub double_click_window_ms: u64,
    /// Pause between `star` calls when favoriting in order
    pub ordered_favorite_delay_ms: u64,
    pub notification_timeout_secs: u64,
    /// Overrides the default tracing filter; `RUST_LOG` still wins
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            library_file: "fixtures/library.json".to_string(),
            double_click_window_ms: 100,
            ordered_favorite_delay_ms: 350,
            notification_timeout_secs: 5,
            log_filter: None,
        }
    }
}

impl AppConfig {
    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_window_ms)
    }

    pub fn ordered_favorite_delay(&self) -> Duration {
        Duration::from_millis(self.ordered_favorite_delay_ms)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = AppConfig::default();
        assert_eq!(config.double_click_window(), Duration::from_millis(100));
        assert_eq!(config.ordered_favorite_delay(), Duration::from_millis(350));
        assert_eq!(config.notification_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "ordered_favorite_delay_ms": 500 }"#).unwrap();
        assert_eq!(config.ordered_favorite_delay_ms, 500);
        assert_eq!(config.double_click_window_ms, 100);
        assert_eq!(config.library_file, "fixtures/library.json");
        assert!(config.log_filter.is_none());
    }
}
