//! ASV Dashboard Core Library
//!
//! This crate provides the data model shared by the dashboard and its backend:
//! tracks parsed from route files, the rolling telemetry series behind the
//! charts, the admin configuration, the sensor-source trait and the JSON wire
//! types of the HTTP API.

pub mod model;
pub mod route;
pub mod sensor;
pub mod series;
pub mod units;
pub mod wire;

pub use model::{
    AdminConfig, ConfigPatch, CvCounts, SensorReadout, TelemetrySample, Theme, Track, TrackId,
    Waypoint, WaypointCategory,
};
pub use sensor::SensorSource;
pub use series::{ChartFrame, RollingSeries, TelemetryBuffer, SERIES_CAPACITY};
