//! Sensor loop
//!
//! Starts the sensor source, reads one readout per interval and broadcasts it
//! to SSE subscribers until cancelled.

use crate::state::AppState;
use asv_core::sensor::SensorSource;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(2000);

/// Main manager loop
pub async fn run(
    state: AppState,
    mut sensor: Box<dyn SensorSource>,
    period: Duration,
    cancel: CancellationToken,
) {
    if let Err(e) = sensor.start() {
        error!("Failed to start sensor {}: {}", sensor.name(), e);
        return;
    }
    info!("Sensor {} started", sensor.name());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => read_cycle(&state, sensor.as_mut()),
        }
    }

    if let Err(e) = sensor.stop() {
        error!("Error stopping sensor {}: {}", sensor.name(), e);
    }
    info!("Sensor {} stopped", sensor.name());
}

/// Read one readout and broadcast it
fn read_cycle(state: &AppState, sensor: &mut dyn SensorSource) {
    match sensor.read_sample() {
        Ok(Some(readout)) => {
            // Ignore error if no receivers (they'll get the next readout)
            let _ = state.telemetry_tx.send(readout);
        }
        Ok(None) => {}
        Err(e) => warn!("Error reading sample from {}: {}", sensor.name(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use asv_sensors::SimulatedSensor;

    #[tokio::test(start_paused = true)]
    async fn test_broadcasts_readouts_until_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig::with_data_dir(dir.path()));
        let mut rx = state.subscribe();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(
            state.clone(),
            Box::new(SimulatedSensor::new()),
            SAMPLE_INTERVAL,
            cancel.clone(),
        ));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_ne!(first, second);

        cancel.cancel();
        task.await.unwrap();
    }
}
