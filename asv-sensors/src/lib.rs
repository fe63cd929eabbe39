//! Sensor sources for the ASV dashboard

pub mod simulated;

pub use simulated::SimulatedSensor;
