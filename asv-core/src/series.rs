//! Rolling telemetry series
//!
//! Fixed-capacity FIFO windows backing the dashboard charts. Once a series is
//! full, every push evicts the oldest point first, so the window always holds
//! the most recent `capacity` samples in chronological order.

use crate::model::TelemetrySample;
use serde::Serialize;
use std::collections::VecDeque;

/// Number of points kept in each chart window
pub const SERIES_CAPACITY: usize = 20;

/// A bounded ring of labelled values
#[derive(Debug, Clone)]
pub struct RollingSeries<T> {
    capacity: usize,
    points: VecDeque<(String, T)>,
}

impl<T: Clone> RollingSeries<T> {
    /// Create a series; a zero capacity is bumped to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a point, returning the evicted oldest point when full
    pub fn push(&mut self, label: impl Into<String>, value: T) -> Option<(String, T)> {
        let evicted = if self.points.len() == self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back((label.into(), value));
        evicted
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn values(&self) -> Vec<T> {
        self.points.iter().map(|(_, value)| value.clone()).collect()
    }
}

/// One line on a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
}

/// Full visible window of one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: &'static str,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Both charts, redrawn wholesale after every push
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub trajectory: Chart,
    pub speed: Chart,
}

/// Trajectory (x, y) and speed series sharing one timestamp stream
#[derive(Debug, Clone)]
pub struct TelemetryBuffer {
    trajectory: RollingSeries<(f64, f64)>,
    speed: RollingSeries<f64>,
}

impl TelemetryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            trajectory: RollingSeries::new(capacity),
            speed: RollingSeries::new(capacity),
        }
    }

    /// Push one sample into both series and return the redrawn window
    pub fn push(&mut self, sample: &TelemetrySample) -> ChartFrame {
        self.trajectory
            .push(sample.timestamp_label.clone(), (sample.x, sample.y));
        self.speed.push(sample.timestamp_label.clone(), sample.speed);
        self.frame()
    }

    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    pub fn trajectory(&self) -> &RollingSeries<(f64, f64)> {
        &self.trajectory
    }

    pub fn speed(&self) -> &RollingSeries<f64> {
        &self.speed
    }

    pub fn frame(&self) -> ChartFrame {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self.trajectory.values().into_iter().unzip();
        ChartFrame {
            trajectory: Chart {
                title: "ASV Position Trajectory",
                labels: self.trajectory.labels(),
                datasets: vec![
                    Dataset {
                        label: "X Position",
                        data: xs,
                    },
                    Dataset {
                        label: "Y Position",
                        data: ys,
                    },
                ],
            },
            speed: Chart {
                title: "Speed Over Time",
                labels: self.speed.labels(),
                datasets: vec![Dataset {
                    label: "Speed (knots)",
                    data: self.speed.values(),
                }],
            },
        }
    }
}

impl Default for TelemetryBuffer {
    fn default() -> Self {
        Self::new(SERIES_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> TelemetrySample {
        TelemetrySample {
            timestamp_label: format!("t{n}"),
            x: n as f64,
            y: -(n as f64),
            speed: n as f64 * 0.5,
        }
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut series = RollingSeries::new(3);
        assert!(series.push("a", 1).is_none());
        assert!(series.push("b", 2).is_none());
        assert_eq!(series.values(), vec![1, 2]);
        assert!(!series.is_full());
    }

    #[test]
    fn test_push_at_capacity_evicts_oldest() {
        let mut series = RollingSeries::new(2);
        series.push("a", 1);
        series.push("b", 2);
        let evicted = series.push("c", 3);
        assert_eq!(evicted, Some(("a".to_string(), 1)));
        assert_eq!(series.labels(), vec!["b", "c"]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut series = RollingSeries::new(0);
        series.push("a", 1);
        series.push("b", 2);
        assert_eq!(series.capacity(), 1);
        assert_eq!(series.values(), vec![2]);
    }

    #[test]
    fn test_capacity_plus_k_keeps_last_capacity() {
        for k in [0usize, 1, 5, 37] {
            let mut buffer = TelemetryBuffer::default();
            for n in 1..=SERIES_CAPACITY + k {
                buffer.push(&sample(n));
            }
            let expected: Vec<String> = (k + 1..=SERIES_CAPACITY + k)
                .map(|n| format!("t{n}"))
                .collect();
            assert_eq!(buffer.speed().labels(), expected);
            assert_eq!(buffer.trajectory().labels(), expected);
        }
    }

    #[test]
    fn test_twenty_one_pushes_evict_first_sample() {
        let mut buffer = TelemetryBuffer::default();
        let mut frame = None;
        for n in 1..=21 {
            frame = Some(buffer.push(&sample(n)));
        }
        let frame = frame.unwrap();

        assert_eq!(buffer.len(), SERIES_CAPACITY);
        assert_eq!(frame.speed.labels.first().map(String::as_str), Some("t2"));
        assert_eq!(frame.speed.labels.last().map(String::as_str), Some("t21"));
        assert_eq!(frame.trajectory.datasets[0].data.first(), Some(&2.0));
        assert_eq!(frame.trajectory.datasets[1].data.last(), Some(&-21.0));
    }

    #[test]
    fn test_frame_is_full_window_and_time_aligned() {
        let mut buffer = TelemetryBuffer::new(4);
        for n in 1..=3 {
            buffer.push(&sample(n));
        }
        let frame = buffer.frame();
        assert_eq!(frame.trajectory.labels, frame.speed.labels);
        assert_eq!(frame.trajectory.datasets.len(), 2);
        assert_eq!(frame.speed.datasets[0].data, vec![0.5, 1.0, 1.5]);
    }
}
