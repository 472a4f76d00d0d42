//! Simulated biometric monitor.
//!
//! On every sample the monitor pulls heart rate, pace and cadence toward the
//! targets of the phase the engine last reported, then:
//!
//! - checks the fatigue index for a spike (mandatory safety alert)
//! - picks at most one coaching message, throttled by a cooldown
//!
//! The monitor owns no timer. The driver calls [`BiometricMonitor::tick`] on
//! a fixed cadence and the monitor ignores ticks while inactive.

use crate::biometrics::{
    fatigue_index, fatigue_spike, step_toward, History, Jitter, TargetTable, Trend,
    CADENCE_JITTER, HEART_RATE_JITTER, PACE_JITTER, REST_RECOVERY_HEART_RATE, WORK_ZONES,
};
use crate::config::MonitorConfig;
use crate::events::BiometricListener;
use crate::{Biometrics, FeedbackEvent, FeedbackKind, Phase};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

pub const SAFETY_ALERT_MESSAGE: &str =
    "Fatigue Index spike detected. Mandating a 10% reduction in effort.";

const PULL_BACK_MESSAGE: &str =
    "Your heart rate is very high and your pace is falling. Let's pull back to recover.";
const PACE_SLOW_MESSAGE: &str = "Pace is a bit slow. Focus on increasing your step rate.";
const PACE_FAST_MESSAGE: &str =
    "You're pushing hard. Let's ease back to a more sustainable pace to conserve energy.";
const CADENCE_LOW_MESSAGE: &str = "Focus on shorter, quicker steps to bring your cadence up.";
const STEADY_PACE_MESSAGE: &str =
    "Excellent. You're holding a strong, steady pace. Keep this rhythm.";
const RECOVERY_MESSAGE: &str =
    "Heart rate is still high. Focus on slow, deep breaths to bring it down.";
const HYDRATION_MESSAGE: &str =
    "Remember to stay hydrated. A quick sip can make a big difference.";

/// Periodic biometric simulator reacting to the engine's phase
pub struct BiometricMonitor<L: BiometricListener> {
    config: MonitorConfig,
    targets: TargetTable,
    listener: L,
    rng: StdRng,
    phase: Phase,
    active: bool,
    current: Biometrics,
    heart_rate: History,
    pace: History,
    cadence: History,
    fatigue: History,
    last_feedback_at: Option<Duration>,
    last_hydration_at: Option<Duration>,
    session_started_at: Option<Duration>,
}

impl<L: BiometricListener> BiometricMonitor<L> {
    pub fn new(config: &MonitorConfig, listener: L) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let initial = Biometrics::default();
        let capacity = config.history_capacity;

        Self {
            config: config.clone(),
            targets: TargetTable::default(),
            listener,
            rng,
            phase: Phase::Idle,
            active: false,
            current: initial,
            heart_rate: History::seeded(capacity, initial.heart_rate),
            pace: History::seeded(capacity, initial.pace),
            cadence: History::seeded(capacity, initial.cadence),
            fatigue: History::new(capacity),
            last_feedback_at: None,
            last_hydration_at: None,
            session_started_at: None,
        }
    }

    /// Replace the per-phase target table
    pub fn with_targets(mut self, targets: TargetTable) -> Self {
        self.targets = targets;
        self
    }

    /// Mirror the engine's current phase
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Drop everything learned in a previous run and start the session and
    /// hydration clocks at `now`
    pub fn begin_session(&mut self, now: Duration) {
        let initial = Biometrics::default();
        let capacity = self.config.history_capacity;

        self.current = initial;
        self.heart_rate = History::seeded(capacity, initial.heart_rate);
        self.pace = History::seeded(capacity, initial.pace);
        self.cadence = History::seeded(capacity, initial.cadence);
        self.fatigue.clear();
        self.last_feedback_at = None;
        self.session_started_at = Some(now);
        self.last_hydration_at = Some(now);
        tracing::debug!("Biometric session begins at {:?}", now);
    }

    /// Mirror the engine's running flag
    ///
    /// The first activation starts the session and hydration clocks unless
    /// [`begin_session`](Self::begin_session) already did.
    /// Deactivating keeps all history.
    pub fn set_active(&mut self, active: bool, now: Duration) {
        if active && !self.active && self.session_started_at.is_none() {
            tracing::debug!("Biometric monitor started at {:?}", now);
            self.session_started_at = Some(now);
            self.last_hydration_at = Some(now);
        }
        self.active = active;
    }

    /// Take one sample and evaluate it; returns false when inactive
    pub fn tick(&mut self, now: Duration) -> bool {
        if !self.active {
            return false;
        }

        self.sample();
        self.push_fatigue(fatigue_index(&self.current));

        if self.feedback_allowed(now) {
            if let Some(feedback) = self.select_feedback(now) {
                tracing::debug!("Feedback ({:?}): {}", feedback.kind, feedback.message);
                self.last_feedback_at = Some(now);
                self.listener.on_feedback(feedback);
            }
        }

        true
    }

    fn sample(&mut self) {
        let jitter = if self.config.jitter {
            Jitter {
                heart_rate: self.rng.gen_range(-HEART_RATE_JITTER..=HEART_RATE_JITTER),
                pace: self.rng.gen_range(-PACE_JITTER..=PACE_JITTER),
                cadence: self.rng.gen_range(-CADENCE_JITTER..=CADENCE_JITTER),
            }
        } else {
            Jitter::default()
        };

        let target = self.targets.for_phase(self.phase);
        self.current = step_toward(&self.current, target, jitter);
        self.heart_rate.push(self.current.heart_rate);
        self.pace.push(self.current.pace);
        self.cadence.push(self.current.cadence);

        tracing::trace!(
            "{} sample: hr {:.1} pace {:.2} cadence {:.1}",
            self.phase,
            self.current.heart_rate,
            self.current.pace,
            self.current.cadence
        );
    }

    /// Record a fatigue index and raise the safety alert on a spike
    ///
    /// Not throttled: the alert repeats whenever a refilled window spikes
    /// again.
    fn push_fatigue(&mut self, index: f64) {
        self.fatigue.push(index);
        if self.phase != Phase::Work {
            return;
        }

        if let Some(spike) = fatigue_spike(&self.fatigue) {
            if spike > self.config.fatigue_spike_percent {
                tracing::warn!("Fatigue index rose {:.1}% over the window", spike);
                self.fatigue.clear();
                self.listener.on_safety_alert(SAFETY_ALERT_MESSAGE);
            }
        }
    }

    fn feedback_allowed(&self, now: Duration) -> bool {
        match self.last_feedback_at {
            Some(at) => now.saturating_sub(at) > self.config.feedback_cooldown(),
            None => true,
        }
    }

    /// Highest-priority message for the current reading, if any
    fn select_feedback(&mut self, now: Duration) -> Option<FeedbackEvent> {
        let reading = self.current;
        let zones = WORK_ZONES;

        let phase_feedback = match self.phase {
            Phase::Work => {
                let pace_trend = self.pace.trend(self.config.trend_window, true);

                if reading.heart_rate > zones.heart_rate_high && pace_trend == Trend::Worsening {
                    Some(FeedbackEvent::new(FeedbackKind::Warning, PULL_BACK_MESSAGE))
                } else if reading.pace > zones.pace_low {
                    Some(FeedbackEvent::new(FeedbackKind::Info, PACE_SLOW_MESSAGE))
                } else if reading.pace > 0.0 && reading.pace < zones.pace_high {
                    Some(FeedbackEvent::new(FeedbackKind::Info, PACE_FAST_MESSAGE))
                } else if reading.cadence < zones.cadence_low {
                    Some(FeedbackEvent::new(FeedbackKind::Info, CADENCE_LOW_MESSAGE))
                } else if pace_trend == Trend::Stable
                    && (reading.pace - zones.pace_target).abs() < zones.pace_band
                {
                    Some(FeedbackEvent::new(FeedbackKind::Motivation, STEADY_PACE_MESSAGE))
                } else {
                    None
                }
            }
            Phase::Rest if reading.heart_rate > REST_RECOVERY_HEART_RATE => {
                Some(FeedbackEvent::new(FeedbackKind::Warning, RECOVERY_MESSAGE))
            }
            Phase::Rest | Phase::Idle | Phase::Warmup | Phase::Cooldown | Phase::Finished => None,
        };

        if phase_feedback.is_some() {
            return phase_feedback;
        }

        if self.phase.is_in_session() && self.hydration_due(now) {
            self.last_hydration_at = Some(now);
            return Some(FeedbackEvent::new(FeedbackKind::Info, HYDRATION_MESSAGE));
        }

        None
    }

    fn hydration_due(&self, now: Duration) -> bool {
        let since = self.last_hydration_at.unwrap_or_default();
        now.saturating_sub(since) > self.config.hydration_interval()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn biometrics(&self) -> &Biometrics {
        &self.current
    }

    pub fn heart_rate_history(&self) -> &History {
        &self.heart_rate
    }

    pub fn pace_history(&self) -> &History {
        &self.pace
    }

    pub fn cadence_history(&self) -> &History {
        &self.cadence
    }

    pub fn fatigue_history(&self) -> &History {
        &self.fatigue
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Virtual time of the first activation
    pub fn session_started_at(&self) -> Option<Duration> {
        self.session_started_at
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }
}
