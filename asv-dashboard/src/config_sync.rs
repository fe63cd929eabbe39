//! Cached copy of the server's admin configuration

use crate::error::DashboardError;
use asv_core::model::AdminConfig;
use tracing::{debug, warn};

pub const MSG_UPDATE_FAILED: &str = "Failed to update settings";
pub const MSG_UPDATED: &str = "Settings updated successfully";

/// Server connection indicator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

/// What changed when a fetched config was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChange {
    pub theme: bool,
    pub default_track: bool,
}

#[derive(Debug, Default)]
pub struct ConfigSync {
    cached: Option<AdminConfig>,
    status: ConnectionStatus,
}

impl ConfigSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&AdminConfig> {
        self.cached.as_ref()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Apply a fetch result. A failure only flips the indicator; the cached
    /// values are kept.
    pub fn apply_fetched(
        &mut self,
        result: Result<AdminConfig, DashboardError>,
    ) -> Option<ConfigChange> {
        match result {
            Ok(config) => {
                self.status = ConnectionStatus::Connected;
                let change = match &self.cached {
                    Some(old) => ConfigChange {
                        theme: old.theme != config.theme,
                        default_track: old.default_track != config.default_track,
                    },
                    None => ConfigChange {
                        theme: true,
                        default_track: true,
                    },
                };
                debug!(?config, "admin config fetched");
                self.cached = Some(config);
                Some(change)
            }
            Err(err) => {
                warn!(error = %err, "admin config fetch failed");
                self.status = ConnectionStatus::Disconnected;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asv_core::model::{Theme, TrackId};

    #[test]
    fn test_fetch_marks_connected() {
        let mut sync = ConfigSync::new();
        let change = sync.apply_fetched(Ok(AdminConfig::default())).unwrap();
        assert!(change.theme && change.default_track);
        assert_eq!(sync.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_failure_keeps_cached_values() {
        let mut sync = ConfigSync::new();
        let config = AdminConfig {
            theme: Theme::Dark,
            ..AdminConfig::default()
        };
        sync.apply_fetched(Ok(config.clone()));
        assert!(sync
            .apply_fetched(Err(DashboardError::Unreachable("down".into())))
            .is_none());
        assert_eq!(sync.status(), ConnectionStatus::Disconnected);
        assert_eq!(sync.cached(), Some(&config));
    }

    #[test]
    fn test_change_detection() {
        let mut sync = ConfigSync::new();
        sync.apply_fetched(Ok(AdminConfig::default()));
        let change = sync
            .apply_fetched(Ok(AdminConfig {
                default_track: TrackId::new('C').unwrap(),
                ..AdminConfig::default()
            }))
            .unwrap();
        assert!(change.default_track);
        assert!(!change.theme);
    }
}
