//! Simulated sensor that generates synthetic vessel readouts
//!
//! Simulates a patrol loop near the home position with cruise legs, turns and
//! loiter phases. Readouts are a pure function of the sample index, so a run
//! is reproducible without any hardware attached.

use anyhow::Result;
use asv_core::{model::SensorReadout, sensor::SensorSource, units::*};
use std::f32::consts::TAU;

/// Home position of the vessel (WGS84 degrees)
pub const HOME_LATITUDE: f64 = -7.0476;
pub const HOME_LONGITUDE: f64 = 110.4418;

/// Seconds of simulated time between readouts
pub const DEFAULT_SAMPLE_PERIOD: f32 = 2.0;

// =============================================================================
// Patrol definition: a sequence of legs that form one loop
// =============================================================================

#[derive(Clone, Copy)]
enum LegKind {
    Cruise, // Holding course at speed
    Turn,   // Constant-rate turn
    Loiter, // Slow drift, e.g. while the camera is capturing
}

#[derive(Clone, Copy)]
struct PatrolLeg {
    kind: LegKind,
    duration: f32,     // seconds
    target_speed: f32, // knots at end of leg
    turn_rate: f32,    // degrees per second (signed: + = starboard)
}

/// A simple rectangular patrol: four straight legs joined by 90° turns
fn demo_patrol() -> Vec<PatrolLeg> {
    vec![
        PatrolLeg { kind: LegKind::Cruise, duration: 40.0, target_speed: 6.5, turn_rate: 0.0 },
        PatrolLeg { kind: LegKind::Turn,   duration: 15.0, target_speed: 4.0, turn_rate: 6.0 },
        PatrolLeg { kind: LegKind::Cruise, duration: 20.0, target_speed: 5.5, turn_rate: 0.0 },
        PatrolLeg { kind: LegKind::Loiter, duration: 12.0, target_speed: 2.2, turn_rate: 0.5 },
        PatrolLeg { kind: LegKind::Turn,   duration: 15.0, target_speed: 4.0, turn_rate: 5.6 },
        PatrolLeg { kind: LegKind::Cruise, duration: 40.0, target_speed: 6.8, turn_rate: 0.0 },
        PatrolLeg { kind: LegKind::Turn,   duration: 15.0, target_speed: 4.2, turn_rate: 6.0 },
        PatrolLeg { kind: LegKind::Cruise, duration: 20.0, target_speed: 5.0, turn_rate: 0.0 },
        PatrolLeg { kind: LegKind::Turn,   duration: 15.0, target_speed: 3.8, turn_rate: 6.0 },
    ]
}

struct PatrolState {
    speed: f32,
    heading: f32,
    /// Fraction of the loop completed, 0.0..1.0
    phase: f32,
}

fn compute_patrol_state(patrol: &[PatrolLeg], loop_duration: f32, time: f32) -> PatrolState {
    let t = time % loop_duration;

    // Find current leg, accumulating heading change from completed legs
    let mut elapsed = 0.0_f32;
    let mut heading = 0.0_f32;
    let mut leg_idx = patrol.len() - 1;
    for (i, leg) in patrol.iter().enumerate() {
        if elapsed + leg.duration > t {
            leg_idx = i;
            break;
        }
        elapsed += leg.duration;
        heading += leg.turn_rate * leg.duration;
    }

    let leg = patrol[leg_idx];
    let leg_t = ((t - elapsed) / leg.duration).clamp(0.0, 1.0);
    heading += leg.turn_rate * (t - elapsed);

    let prev_speed = if leg_idx > 0 {
        patrol[leg_idx - 1].target_speed
    } else {
        patrol[patrol.len() - 1].target_speed
    };
    let mut speed = lerp(prev_speed, leg.target_speed, smoothstep(leg_t));
    if let LegKind::Loiter = leg.kind {
        // Station keeping: speed wanders a little around the target
        speed += 0.3 * (leg_t * TAU).sin();
    }

    PatrolState {
        speed,
        heading,
        phase: t / loop_duration,
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Simple deterministic noise from a seed
fn noise(seed: f32) -> f32 {
    let x = (seed * 12.9898 + 78.233).sin() * 43_758.547;
    x - x.floor()
}

/// Small jitter centered around 0
fn jitter(seed: f32, amplitude: f32) -> f32 {
    (noise(seed) - 0.5) * 2.0 * amplitude
}

// =============================================================================
// SimulatedSensor
// =============================================================================

pub struct SimulatedSensor {
    active: bool,
    sample_count: u64,
    sample_period: f32,
    patrol: Vec<PatrolLeg>,
    loop_duration: f32,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self::with_sample_period(DEFAULT_SAMPLE_PERIOD)
    }

    /// Use a different amount of simulated time per readout
    pub fn with_sample_period(sample_period: f32) -> Self {
        let patrol = demo_patrol();
        let loop_duration: f32 = patrol.iter().map(|leg| leg.duration).sum();
        Self {
            active: false,
            sample_count: 0,
            sample_period: sample_period.max(0.01),
            patrol,
            loop_duration,
        }
    }

    pub fn samples_read(&self) -> u64 {
        self.sample_count
    }

    fn generate_readout(&mut self) -> SensorReadout {
        let t = self.sample_count as f32 * self.sample_period;
        self.sample_count += 1;
        let n = self.sample_count as f32; // noise seed

        let state = compute_patrol_state(&self.patrol, self.loop_duration, t);
        let angle = state.phase * TAU;

        let speed = (state.speed + jitter(n, 0.2)).clamp(2.0, 7.0);
        let heading = Degrees::normalized(state.heading + jitter(n * 1.1, 3.0));

        // Slow weather drift over tens of minutes
        let temperature = (30.5 + 2.0 * (t / 300.0).sin() + jitter(n * 1.2, 0.3)).clamp(28.0, 33.0);
        let humidity = (70.0 + 8.0 * (t / 450.0).cos() + jitter(n * 1.3, 1.0)).clamp(60.0, 80.0);

        // Figure-of-eight trajectory offset around home, metres
        let x = (4.5 * angle.sin() + jitter(n * 1.4, 0.3)).clamp(-5.0, 5.0);
        let y = (4.5 * (2.0 * angle).sin() + jitter(n * 1.5, 0.3)).clamp(-5.0, 5.0);

        SensorReadout {
            heading,
            speed: Knots(speed),
            temperature: Celsius(temperature),
            humidity: Percentage::new(humidity / 100.0),
            latitude: HOME_LATITUDE + 0.0005 * (1.0 + angle.sin() as f64 * 0.9),
            longitude: HOME_LONGITUDE + 0.0005 * (1.0 + angle.cos() as f64 * 0.9),
            x: x as f64,
            y: y as f64,
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SimulatedSensor {
    fn name(&self) -> &str {
        "Simulated"
    }

    fn start(&mut self) -> Result<()> {
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.active = false;
        Ok(())
    }

    fn read_sample(&mut self) -> Result<Option<SensorReadout>> {
        if !self.active {
            return Ok(None);
        }
        Ok(Some(self.generate_readout()))
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
