//! Route file parsing
//!
//! Route files are line-oriented CSV: a header line followed by rows of
//! `latitude,longitude,category,roundIndex,rotation`. A malformed row is
//! dropped on its own; it never fails the whole load.

use crate::model::{Track, TrackId, Waypoint};
use thiserror::Error;

/// Minimum number of comma-separated fields in a route row
pub const ROUTE_FIELDS: usize = 5;

/// Why a single row was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected at least 5 fields, found {0}")]
    TooFewFields(usize),
    #[error("latitude {0:?} is not a finite number")]
    BadLatitude(String),
    #[error("longitude {0:?} is not a finite number")]
    BadLongitude(String),
}

/// Result of parsing a route file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRoute {
    pub track: Track,
    /// Rows dropped as malformed (blank lines are not counted)
    pub skipped: usize,
}

/// Parse one data row into a waypoint
pub fn parse_row(line: &str) -> Result<Waypoint, RowError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < ROUTE_FIELDS {
        return Err(RowError::TooFewFields(fields.len()));
    }

    let latitude = parse_coordinate(fields[0])
        .ok_or_else(|| RowError::BadLatitude(fields[0].to_string()))?;
    let longitude = parse_coordinate(fields[1])
        .ok_or_else(|| RowError::BadLongitude(fields[1].to_string()))?;

    Ok(Waypoint {
        latitude,
        longitude,
        category: fields[2].to_string(),
        round_index: fields[3].to_string(),
        rotation: fields[4].to_string(),
    })
}

fn parse_coordinate(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a whole route file. The first line is a header and is discarded;
/// waypoints keep input order.
pub fn parse_route(id: TrackId, text: &str) -> ParsedRoute {
    let mut waypoints = Vec::new();
    let mut skipped = 0;

    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line) {
            Ok(waypoint) => waypoints.push(waypoint),
            Err(_) => skipped += 1,
        }
    }

    ParsedRoute {
        track: Track::new(id, waypoints),
        skipped,
    }
}
