//! Listener seams between the engines and whoever drives them.
//!
//! The workout engine reports transitions through [`PhaseListener`], the
//! biometric monitor reports coaching and safety events through
//! [`BiometricListener`]. Both fire synchronously from inside the call that
//! caused them. [`EventLog`] implements both and buffers events for a driver
//! to dispatch after the call returns.

use crate::{FeedbackEvent, Phase};

/// Receives every engine phase transition
pub trait PhaseListener {
    fn on_phase_change(&mut self, phase: Phase, exercise_name: &str);
}

impl<F> PhaseListener for F
where
    F: FnMut(Phase, &str),
{
    fn on_phase_change(&mut self, phase: Phase, exercise_name: &str) {
        self(phase, exercise_name)
    }
}

/// Receives coaching feedback and mandatory safety alerts
pub trait BiometricListener {
    fn on_feedback(&mut self, feedback: FeedbackEvent);
    fn on_safety_alert(&mut self, message: &str);
}

/// Anything the engine or the monitor reported
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkoutEvent {
    PhaseChanged { phase: Phase, exercise: String },
    Feedback(FeedbackEvent),
    SafetyAlert(String),
}

/// Buffer of events in the order they fired
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<WorkoutEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[WorkoutEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take all buffered events, leaving the log empty
    pub fn drain(&mut self) -> Vec<WorkoutEvent> {
        std::mem::take(&mut self.events)
    }

    /// Phase transitions only, as `(phase, exercise)` pairs
    pub fn transitions(&self) -> Vec<(Phase, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                WorkoutEvent::PhaseChanged { phase, exercise } => Some((*phase, exercise.clone())),
                WorkoutEvent::Feedback(_) | WorkoutEvent::SafetyAlert(_) => None,
            })
            .collect()
    }
}

impl PhaseListener for EventLog {
    fn on_phase_change(&mut self, phase: Phase, exercise_name: &str) {
        self.events.push(WorkoutEvent::PhaseChanged {
            phase,
            exercise: exercise_name.to_string(),
        });
    }
}

impl BiometricListener for EventLog {
    fn on_feedback(&mut self, feedback: FeedbackEvent) {
        self.events.push(WorkoutEvent::Feedback(feedback));
    }

    fn on_safety_alert(&mut self, message: &str) {
        self.events.push(WorkoutEvent::SafetyAlert(message.to_string()));
    }
}
