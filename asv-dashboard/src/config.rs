//! Dashboard settings from the environment

use crate::telemetry::UPDATE_INTERVAL;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Backend base URL
    pub api_url: String,
    /// Telemetry sample period
    pub update_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            update_interval: UPDATE_INTERVAL,
        }
    }
}

impl DashboardConfig {
    /// Read `ASV_API_URL` and `ASV_UPDATE_INTERVAL_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("ASV_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(raw) = lookup("ASV_UPDATE_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.update_interval = Duration::from_millis(ms),
                _ => warn!(value = %raw, "ignoring invalid ASV_UPDATE_INTERVAL_MS"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[]));
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.update_interval, Duration::from_millis(2000));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("ASV_API_URL", "http://boat.local:9000"),
            ("ASV_UPDATE_INTERVAL_MS", "500"),
        ]));
        assert_eq!(config.api_url, "http://boat.local:9000");
        assert_eq!(config.update_interval, Duration::from_millis(500));

        let config = DashboardConfig::from_lookup(lookup(&[("ASV_UPDATE_INTERVAL_MS", "0")]));
        assert_eq!(config.update_interval, UPDATE_INTERVAL);
    }
}
