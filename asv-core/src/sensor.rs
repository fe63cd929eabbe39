//! Sensor source trait definition

use crate::model::SensorReadout;
use anyhow::Result;

/// Trait for vessel sensor feeds
///
/// A source is started when the monitoring view becomes visible and stopped
/// when it is hidden. The dashboard polls it once per telemetry tick.
pub trait SensorSource: Send + Sync {
    /// Get the name of this source (e.g., "Simulated")
    fn name(&self) -> &str;

    /// Start producing readouts
    fn start(&mut self) -> Result<()>;

    /// Stop producing readouts and release any resources
    fn stop(&mut self) -> Result<()>;

    /// Read the latest readout
    ///
    /// Returns:
    /// - `Ok(Some(readout))` if a readout is available
    /// - `Ok(None)` if the source is inactive or has nothing new
    /// - `Err(_)` if the source failed
    fn read_sample(&mut self) -> Result<Option<SensorReadout>>;

    /// Get whether the source is currently active
    fn is_active(&self) -> bool;
}
