//! Biometric simulation primitives.
//!
//! Bounded sample histories, trend classification, the per-phase target
//! table and the fatigue index. The [`crate::monitor`] module combines them
//! into the periodic monitor.

use crate::{Biometrics, Phase};
use std::collections::VecDeque;

/// Share of the gap to the target closed on every sample
pub const ATTRACTION: f64 = 0.1;

pub const HEART_RATE_RANGE: (f64, f64) = (60.0, 190.0);
/// Range of a moving pace; 0 means not moving
pub const PACE_RANGE: (f64, f64) = (3.0, 10.0);
/// Range of a moving cadence; 0 means not moving
pub const CADENCE_RANGE: (f64, f64) = (130.0, 190.0);

/// Half-width of the uniform jitter added to each field
pub const HEART_RATE_JITTER: f64 = 2.5;
pub const PACE_JITTER: f64 = 0.1;
pub const CADENCE_JITTER: f64 = 2.0;

/// Relative change inside the trend window that still counts as stable
pub const TREND_TOLERANCE: f64 = 0.02;

/// Heart rate above which rest is not bringing the user down
pub const REST_RECOVERY_HEART_RATE: f64 = 135.0;

/// Thresholds used while the engine is in `work`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkZones {
    /// Slower than this is too slow (min/km, lower is faster)
    pub pace_low: f64,
    pub pace_target: f64,
    /// Faster than this is too fast
    pub pace_high: f64,
    /// Within this distance of the target pace counts as on target
    pub pace_band: f64,
    pub cadence_low: f64,
    pub heart_rate_high: f64,
}

pub const WORK_ZONES: WorkZones = WorkZones {
    pace_low: 5.5,
    pace_target: 5.0,
    pace_high: 4.5,
    pace_band: 0.3,
    cadence_low: 168.0,
    heart_rate_high: 170.0,
};

// ============================================================================
// History
// ============================================================================

/// Fixed-capacity trailing window of samples, oldest evicted first
#[derive(Clone, Debug, PartialEq)]
pub struct History {
    values: VecDeque<f64>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// History holding a single starting sample
    pub fn seeded(capacity: usize, initial: f64) -> Self {
        let mut history = Self::new(capacity);
        history.push(initial);
        history
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<f64> {
        self.values.front().copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Trend over the trailing `window` samples
    pub fn trend(&self, window: usize, lower_is_better: bool) -> Trend {
        let (front, back) = self.values.as_slices();
        if back.is_empty() {
            calculate_trend(front, window, lower_is_better)
        } else {
            calculate_trend(&self.to_vec(), window, lower_is_better)
        }
    }
}

// ============================================================================
// Trend
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

impl Trend {
    /// 1 improving, 0 stable, -1 worsening
    pub fn signum(&self) -> i8 {
        match self {
            Trend::Improving => 1,
            Trend::Stable => 0,
            Trend::Worsening => -1,
        }
    }
}

/// Classify the trailing `window` samples of `history`
///
/// Compares the first and last sample of the window. Changes within 2% of
/// the first sample are stable. With `lower_is_better` (pace) a falling
/// value is an improvement.
pub fn calculate_trend(history: &[f64], window: usize, lower_is_better: bool) -> Trend {
    if window == 0 || history.len() < window {
        return Trend::Stable;
    }

    let recent = &history[history.len() - window..];
    let first = recent[0];
    let last = recent[recent.len() - 1];
    let tolerance = first * TREND_TOLERANCE;

    let rising = last > first + tolerance;
    let falling = last < first - tolerance;

    match (rising, falling, lower_is_better) {
        (true, _, false) | (_, true, true) => Trend::Improving,
        (_, true, false) | (true, _, true) => Trend::Worsening,
        _ => Trend::Stable,
    }
}

// ============================================================================
// Targets
// ============================================================================

/// Values the simulation is pulled toward during one phase
///
/// `None` means no target: the field holds its previous value. A pace or
/// cadence target of 0 marks a stationary phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseTarget {
    pub heart_rate: Option<f64>,
    pub pace: Option<f64>,
    pub cadence: Option<f64>,
}

impl PhaseTarget {
    pub const fn new(heart_rate: f64, pace: f64, cadence: f64) -> Self {
        Self {
            heart_rate: Some(heart_rate),
            pace: Some(pace),
            cadence: Some(cadence),
        }
    }

    /// No attraction on any field
    pub const fn hold() -> Self {
        Self {
            heart_rate: None,
            pace: None,
            cadence: None,
        }
    }
}

/// One target per engine phase
#[derive(Clone, Debug, PartialEq)]
pub struct TargetTable {
    pub idle: PhaseTarget,
    pub warmup: PhaseTarget,
    pub work: PhaseTarget,
    pub rest: PhaseTarget,
    pub cooldown: PhaseTarget,
    pub finished: PhaseTarget,
}

impl Default for TargetTable {
    fn default() -> Self {
        Self {
            idle: PhaseTarget::new(70.0, 0.0, 0.0),
            warmup: PhaseTarget::new(110.0, 7.0, 155.0),
            work: PhaseTarget::new(155.0, 5.0, 175.0),
            rest: PhaseTarget::new(100.0, 0.0, 0.0),
            cooldown: PhaseTarget::new(90.0, 8.0, 140.0),
            finished: PhaseTarget::new(80.0, 0.0, 0.0),
        }
    }
}

impl TargetTable {
    pub fn for_phase(&self, phase: Phase) -> &PhaseTarget {
        match phase {
            Phase::Idle => &self.idle,
            Phase::Warmup => &self.warmup,
            Phase::Work => &self.work,
            Phase::Rest => &self.rest,
            Phase::Cooldown => &self.cooldown,
            Phase::Finished => &self.finished,
        }
    }
}

/// Random offsets applied to one sample, already scaled
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Jitter {
    pub heart_rate: f64,
    pub pace: f64,
    pub cadence: f64,
}

/// Compute the next reading from the previous one
pub fn step_toward(previous: &Biometrics, target: &PhaseTarget, jitter: Jitter) -> Biometrics {
    let heart_rate = match target.heart_rate {
        Some(t) => {
            let next = previous.heart_rate + (t - previous.heart_rate) * ATTRACTION + jitter.heart_rate;
            next.clamp(HEART_RATE_RANGE.0, HEART_RATE_RANGE.1)
        }
        None => previous.heart_rate,
    };

    Biometrics {
        heart_rate,
        pace: step_motion(previous.pace, target.pace, jitter.pace, PACE_RANGE),
        cadence: step_motion(previous.cadence, target.cadence, jitter.cadence, CADENCE_RANGE),
    }
}

/// Pace and cadence are 0 while standing still
fn step_motion(previous: f64, target: Option<f64>, jitter: f64, range: (f64, f64)) -> f64 {
    match target {
        None => previous,
        Some(t) if t <= 0.0 => 0.0,
        Some(t) if previous <= 0.0 => t.clamp(range.0, range.1),
        Some(t) => (previous + (t - previous) * ATTRACTION + jitter).clamp(range.0, range.1),
    }
}

// ============================================================================
// Fatigue
// ============================================================================

/// Exertion score in `[0, 100]`: 60% heart rate, 40% pace effort
///
/// Heart rate is normalized over 60–190 bpm; pace effort over 10–3 min/km,
/// and is 0 while not moving.
pub fn fatigue_index(reading: &Biometrics) -> f64 {
    let span = HEART_RATE_RANGE.1 - HEART_RATE_RANGE.0;
    let normalized_hr = (reading.heart_rate - HEART_RATE_RANGE.0) / span;
    let pace_effort = if reading.pace > 0.0 {
        (PACE_RANGE.1 - reading.pace) / (PACE_RANGE.1 - PACE_RANGE.0)
    } else {
        0.0
    };
    (normalized_hr * 0.6 + pace_effort * 0.4) * 100.0
}

/// Percentage rise from the oldest to the newest sample of a full window
///
/// `None` until the window is full, or when the oldest sample is not
/// positive.
pub fn fatigue_spike(history: &History) -> Option<f64> {
    if !history.is_full() {
        return None;
    }
    let oldest = history.oldest()?;
    let newest = history.latest()?;
    if oldest <= 0.0 {
        return None;
    }
    Some((newest - oldest) / oldest * 100.0)
}
