//! Telemetry ticker
//!
//! Drives one sample per period while the monitoring view is visible. When
//! stopped, `tick` never resolves so it can sit in a `select!` unconditionally.

use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Default period between telemetry samples
pub const UPDATE_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug)]
pub struct TelemetryTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl TelemetryTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Start ticking; the first tick fires immediately. No-op when running.
    pub fn start(&mut self) {
        if self.interval.is_none() {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(ticker);
        }
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for TelemetryTicker {
    fn default() -> Self {
        Self::new(UPDATE_INTERVAL)
    }
}

/// Chart label for a sample taken now, local wall-clock time
pub fn timestamp_label() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let mut ticker = TelemetryTicker::new(Duration::from_millis(2000));
        ticker.start();
        let begin = tokio::time::Instant::now();
        ticker.tick().await;
        ticker.tick().await;
        ticker.tick().await;
        assert_eq!(begin.elapsed(), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_never_fires() {
        let mut ticker = TelemetryTicker::default();
        ticker.start();
        ticker.stop();
        assert!(!ticker.is_running());
        let fired = tokio::time::timeout(Duration::from_secs(10), ticker.tick()).await;
        assert!(fired.is_err());
    }

    #[test]
    fn test_timestamp_label_format() {
        let label = timestamp_label();
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);
    }
}
