//! Dashboard data model
//!
//! Tracks and waypoints come from route files, telemetry samples and sensor
//! readouts come from the sensor feed, and `AdminConfig` mirrors the single
//! server-resident admin state.
//!
//! Coordinates are WGS84 degrees. The trajectory offsets `x`/`y` are metres
//! relative to the vessel's home position.

use crate::units::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// === Tracks ===

/// Single-letter track identifier, always stored upper case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackId(char);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid track id {0:?}: expected a single letter")]
pub struct InvalidTrackId(pub String);

impl TrackId {
    pub fn new(letter: char) -> Result<Self, InvalidTrackId> {
        if letter.is_ascii_alphabetic() {
            Ok(Self(letter.to_ascii_uppercase()))
        } else {
            Err(InvalidTrackId(letter.to_string()))
        }
    }

    pub fn letter(&self) -> char {
        self.0
    }

    /// Name of the route file served for this track, e.g. `lintasan_a.csv`
    pub fn route_file(&self) -> String {
        format!("lintasan_{}.csv", self.0.to_ascii_lowercase())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self('A')
    }
}

impl FromStr for TrackId {
    type Err = InvalidTrackId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::new(letter).map_err(|_| InvalidTrackId(s.to_string())),
            _ => Err(InvalidTrackId(s.to_string())),
        }
    }
}

impl TryFrom<String> for TrackId {
    type Error = InvalidTrackId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TrackId> for String {
    fn from(id: TrackId) -> Self {
        id.0.to_string()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Marker classification derived from a waypoint's category text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointCategory {
    Red,
    Green,
    Blue,
    Other,
}

impl WaypointCategory {
    /// Case-sensitive substring test, first match wins: red, green, blue
    pub fn classify(category: &str) -> Self {
        if category.contains("red") {
            Self::Red
        } else if category.contains("green") {
            Self::Green
        } else if category.contains("blue") {
            Self::Blue
        } else {
            Self::Other
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Red => "🔴",
            Self::Green => "🟢",
            Self::Blue => "🔵",
            Self::Other => "📍",
        }
    }
}

/// One classified point along a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Raw category text from the route file (e.g. `red_buoy`)
    pub category: String,
    pub round_index: String,
    pub rotation: String,
}

impl Waypoint {
    pub fn kind(&self) -> WaypointCategory {
        WaypointCategory::classify(&self.category)
    }

    pub fn position(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    /// Popup text shown for the waypoint's marker
    pub fn popup_text(&self) -> String {
        format!(
            "{}\nRound: {}\nLat: {:.6}\nLon: {:.6}",
            self.category, self.round_index, self.latitude, self.longitude
        )
    }
}

/// A named, ordered sequence of waypoints. Order determines the route line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub waypoints: Vec<Waypoint>,
}

impl Track {
    pub fn new(id: TrackId, waypoints: Vec<Waypoint>) -> Self {
        Self { id, waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint coordinates in route order
    pub fn path(&self) -> Vec<LatLon> {
        self.waypoints.iter().map(Waypoint::position).collect()
    }

    /// Bounding box of all waypoints, `None` for an empty track
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.waypoints.iter().map(Waypoint::position))
    }
}

// === Geometry ===

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = LatLon>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds {
                    south: p.lat,
                    west: p.lon,
                    north: p.lat,
                    east: p.lon,
                },
                Some(b) => Bounds {
                    south: b.south.min(p.lat),
                    west: b.west.min(p.lon),
                    north: b.north.max(p.lat),
                    east: b.east.max(p.lon),
                },
            })
        })
    }

    pub fn contains(&self, point: LatLon) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lon)
    }
}

// === Telemetry ===

/// One reading fed into the rolling chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp_label: String,
    pub x: f64,
    pub y: f64,
    /// Speed in knots
    pub speed: f64,
}

impl TelemetrySample {
    pub fn from_readout(timestamp_label: impl Into<String>, readout: &SensorReadout) -> Self {
        Self {
            timestamp_label: timestamp_label.into(),
            x: readout.x,
            y: readout.y,
            speed: readout.speed.0 as f64,
        }
    }
}

/// The sensor card: one snapshot of the vessel's instruments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReadout {
    pub heading: Degrees,
    pub speed: Knots,
    pub temperature: Celsius,
    pub humidity: Percentage,
    pub latitude: f64,
    pub longitude: f64,
    /// Trajectory offset from home (metres, east)
    pub x: f64,
    /// Trajectory offset from home (metres, north)
    pub y: f64,
}

// === Admin configuration ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme {other:?}")),
        }
    }
}

/// Computer-vision detection counters shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvCounts {
    pub red: u32,
    pub green: u32,
    pub track: u32,
}

/// Server-resident admin state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    pub theme: Theme,
    #[serde(rename = "defaultTrack")]
    pub default_track: TrackId,
    pub cv_counts: CvCounts,
}

impl AdminConfig {
    /// Merge a partial update; absent fields keep their current value
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(track) = patch.default_track {
            self.default_track = track;
        }
        if let Some(counts) = patch.cv_counts {
            self.cv_counts = counts;
        }
    }
}

/// Partial admin state update. `cv_counts` is replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(
        default,
        rename = "defaultTrack",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_track: Option<TrackId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_counts: Option<CvCounts>,
}

impl ConfigPatch {
    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.default_track.is_none() && self.cv_counts.is_none()
    }
}

impl From<AdminConfig> for ConfigPatch {
    fn from(config: AdminConfig) -> Self {
        Self {
            theme: Some(config.theme),
            default_track: Some(config.default_track),
            cv_counts: Some(config.cv_counts),
        }
    }
}
