//! Core domain types for the Athena workout player.
//!
//! This module defines the fundamental types used throughout the system:
//! - Sessions, blocks and exercises
//! - Engine phases
//! - Biometric readings and feedback
//! - Workout records and multi-week programs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Session Model
// ============================================================================

/// Overall intensity label of a session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

/// Kind of block a session is made of
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockPhase {
    Warmup,
    Work,
    Cooldown,
}

/// A single timed exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_seconds: u32,
}

impl Exercise {
    pub fn new(name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
        }
    }
}

/// A block of exercises repeated for one or more rounds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    #[serde(rename = "type")]
    pub phase: BlockPhase,
    pub rounds: u32,
    #[serde(
        rename = "restBetweenRounds",
        default,
        deserialize_with = "null_as_zero"
    )]
    pub rest_between_rounds_seconds: u32,
    pub exercises: Vec<Exercise>,
}

impl Block {
    /// Single-round block without rest
    pub fn new(phase: BlockPhase, exercises: Vec<Exercise>) -> Self {
        Self {
            phase,
            rounds: 1,
            rest_between_rounds_seconds: 0,
            exercises,
        }
    }

    /// Repeat the block `rounds` times with `rest_seconds` between rounds
    pub fn with_rounds(mut self, rounds: u32, rest_seconds: u32) -> Self {
        self.rounds = rounds;
        self.rest_between_rounds_seconds = rest_seconds;
        self
    }
}

/// Authoring services send `null` for blocks without rest.
fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// A complete workout description
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub description: String,
    pub intensity: Intensity,
    pub blocks: Vec<Block>,
}

// ============================================================================
// Engine Phases
// ============================================================================

/// High-level activity tag reported by the workout engine
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Warmup,
    Work,
    Cooldown,
    Rest,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Warmup => "warmup",
            Phase::Work => "work",
            Phase::Cooldown => "cooldown",
            Phase::Rest => "rest",
            Phase::Finished => "finished",
        }
    }

    /// True for every phase that belongs to a running session
    pub fn is_in_session(&self) -> bool {
        match self {
            Phase::Idle | Phase::Finished => false,
            Phase::Warmup | Phase::Work | Phase::Cooldown | Phase::Rest => true,
        }
    }
}

impl From<BlockPhase> for Phase {
    fn from(phase: BlockPhase) -> Self {
        match phase {
            BlockPhase::Warmup => Phase::Warmup,
            BlockPhase::Work => Phase::Work,
            BlockPhase::Cooldown => Phase::Cooldown,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Biometrics and Feedback
// ============================================================================

/// One simulated biometric reading
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Biometrics {
    /// Beats per minute
    pub heart_rate: f64,
    /// Minutes per kilometre, 0 when not moving
    pub pace: f64,
    /// Steps per minute, 0 when not moving
    pub cadence: f64,
}

impl Default for Biometrics {
    fn default() -> Self {
        Self {
            heart_rate: 70.0,
            pace: 0.0,
            cadence: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Motivation,
    Warning,
    Info,
}

/// Coaching message raised by the biometric monitor
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub kind: FeedbackKind,
    pub message: String,
}

impl FeedbackEvent {
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Delivery style requested from the narration service
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VoiceStyle {
    Motivational,
    Calm,
    Commanding,
    Technical,
}

impl From<FeedbackKind> for VoiceStyle {
    fn from(kind: FeedbackKind) -> Self {
        match kind {
            FeedbackKind::Motivation => VoiceStyle::Motivational,
            FeedbackKind::Warning | FeedbackKind::Info => VoiceStyle::Technical,
        }
    }
}

// ============================================================================
// History and Programs
// ============================================================================

/// A finished workout as stored in history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub workout_name: String,
    pub duration_seconds: u32,
}

impl WorkoutRecord {
    pub fn new(workout_name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            workout_name: workout_name.into(),
            duration_seconds,
        }
    }
}

/// Training goal used by programs and the authoring service
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutGoal {
    Strength,
    Endurance,
    Flexibility,
    FatBurn,
    Cardio,
    Mobility,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Energetic,
    Normal,
    Tired,
}

/// What a program day asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayGoal {
    Train(WorkoutGoal),
    Rest,
}

#[derive(Clone, Debug)]
pub struct ProgramDay {
    pub day: u32,
    pub goal: DayGoal,
    pub title: String,
}

#[derive(Clone, Debug)]
pub struct ProgramWeek {
    pub week: u32,
    pub days: Vec<ProgramDay>,
}

impl ProgramWeek {
    /// Number of days in the week that are not rest days
    pub fn training_days(&self) -> usize {
        self.days
            .iter()
            .filter(|d| d.goal != DayGoal::Rest)
            .count()
    }
}

/// A multi-week training plan
#[derive(Clone, Debug)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_weeks: u32,
    pub weeks: Vec<ProgramWeek>,
}

/// Position of the user inside a started program (1-based)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveProgramState {
    pub program_id: String,
    pub current_week: u32,
    pub current_day: u32,
    pub started_date: DateTime<Utc>,
}
