//! Track selection and route loading

use crate::error::DashboardError;
use asv_core::model::{Track, TrackId};
use asv_core::route::parse_route;
use tracing::{info, warn};

pub const MSG_LOAD_FAILED: &str = "Failed to load track data";

/// Tracks which route is selected and which one was last loaded
#[derive(Debug, Default)]
pub struct TrackLoader {
    selected: TrackId,
    loaded: Option<Track>,
}

impl TrackLoader {
    pub fn selected(&self) -> TrackId {
        self.selected
    }

    /// The last successfully loaded track
    pub fn current(&self) -> Option<&Track> {
        self.loaded.as_ref()
    }

    /// Change the selection. Returns true when it differs from before.
    pub fn select(&mut self, track: TrackId) -> bool {
        let changed = self.selected != track;
        self.selected = track;
        changed
    }

    /// Apply a fetched route. On success the parsed track replaces the
    /// current one and is returned; on failure the current one is kept.
    pub fn complete(
        &mut self,
        track: TrackId,
        result: Result<String, DashboardError>,
    ) -> Result<&Track, DashboardError> {
        match result {
            Ok(text) => {
                let parsed = parse_route(track, &text);
                if parsed.skipped > 0 {
                    warn!(track = %track, skipped = parsed.skipped, "dropped malformed route rows");
                }
                info!(track = %track, waypoints = parsed.track.len(), "route loaded");
                Ok(self.loaded.insert(parsed.track))
            }
            Err(err) => {
                warn!(track = %track, error = %err, "route load failed");
                Err(err)
            }
        }
    }
}
