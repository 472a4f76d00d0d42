#![forbid(unsafe_code)]

//! Core domain model and runtime for the Athena guided workout player.
//!
//! This crate provides:
//! - Domain types (sessions, phases, biometrics, feedback, programs)
//! - The workout engine and the simulated biometric monitor
//! - A cooperative scheduler and the player that drives both
//! - Voice commands, narration and workout authoring seams
//! - Persistence (history log, CSV export, program state)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod session;
pub mod scheduler;
pub mod events;
pub mod engine;
pub mod biometrics;
pub mod monitor;
pub mod narration;
pub mod commands;
pub mod authoring;
pub mod player;
pub mod history;
pub mod program;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use engine::WorkoutEngine;
pub use events::{BiometricListener, EventLog, PhaseListener, WorkoutEvent};
pub use monitor::BiometricMonitor;
pub use narration::{LogNarrator, Narrator};
pub use commands::{Command, CommandSet};
pub use authoring::{resolve_session, GenerationRequest, WorkoutGenerator};
pub use player::WorkoutPlayer;
pub use history::{read_history, HistorySink, JsonlHistory};
pub use program::ProgramTracker;
