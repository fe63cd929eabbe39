//! Type-safe wrappers for sensor units
//!
//! Newtype wrappers around f32 so a heading can never be passed where a speed
//! is expected. All unit types serialize with 4 decimal places to keep the
//! JSON payload small.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Round f32 to 4 decimal places for compact JSON serialization
fn round4<S: serde::Serializer>(val: &f32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f32((*val * 10000.0).round() / 10000.0)
}

/// Compass heading in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Degrees(#[serde(serialize_with = "round4")] pub f32);

impl Degrees {
    /// Create a heading wrapped into [0, 360)
    pub fn normalized(value: f32) -> Self {
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        let wrapped = value.rem_euclid(360.0);
        Self(if wrapped >= 360.0 { 0.0 } else { wrapped })
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}°", self.0.floor())
    }
}

/// Speed over water in knots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knots(#[serde(serialize_with = "round4")] pub f32);

impl fmt::Display for Knots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kts", self.0)
    }
}

/// Celsius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Celsius(#[serde(serialize_with = "round4")] pub f32);

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

/// Percentage (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentage(#[serde(serialize_with = "round4")] pub f32);

impl Percentage {
    /// Create a new percentage, clamping to [0.0, 1.0]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Get as percentage (0-100)
    pub fn as_percent(&self) -> f32 {
        self.0 * 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.as_percent().floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_normalized_wraps() {
        assert_eq!(Degrees::normalized(370.0), Degrees(10.0));
        assert_eq!(Degrees::normalized(-90.0), Degrees(270.0));
    }

    #[test]
    fn test_percentage_clamp() {
        assert_eq!(Percentage::new(1.5).0, 1.0);
        assert_eq!(Percentage::new(-0.5).0, 0.0);
        assert_eq!(Percentage::new(0.5).0, 0.5);
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(Degrees(123.7).to_string(), "123°");
        assert_eq!(Knots(4.26).to_string(), "4.3 kts");
        assert_eq!(Celsius(30.04).to_string(), "30.0°C");
        assert_eq!(Percentage::new(0.705).to_string(), "70%");
    }

    #[test]
    fn test_serialization_rounds_to_four_places() {
        let json = serde_json::to_string(&Knots(1.234_567)).unwrap();
        assert_eq!(json, "1.2346");
    }
}
