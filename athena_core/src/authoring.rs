//! Workout authoring seam.
//!
//! Sessions can come from an external authoring service. The player only
//! sees the [`WorkoutGenerator`] trait; whatever a generator returns is
//! validated before use and a built-in session stands in when it fails.

use crate::{Error, FitnessLevel, Mood, Result, Session, WorkoutGoal};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Position inside a program, passed along so the service can progress load
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramContext {
    pub program_name: String,
    pub week: u32,
    pub day: u32,
}

/// Parameters for generating a session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub goal: WorkoutGoal,
    pub duration_minutes: u32,
    pub level: FitnessLevel,
    pub mood: Mood,
    pub program: Option<ProgramContext>,
}

impl GenerationRequest {
    pub fn new(goal: WorkoutGoal, duration_minutes: u32) -> Self {
        Self {
            goal,
            duration_minutes,
            level: FitnessLevel::Intermediate,
            mood: Mood::Normal,
            program: None,
        }
    }

    pub fn with_program(mut self, program: ProgramContext) -> Self {
        self.program = Some(program);
        self
    }

    /// Instruction text for language-model backed services
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Generate a complete workout session in JSON.\n\
             - Goal: {:?}\n\
             - Total duration: about {} minutes\n\
             - Fitness level: {:?}\n\
             - Mood: {:?}\n",
            self.goal, self.duration_minutes, self.level, self.mood
        );
        if let Some(program) = &self.program {
            // Writing to a String cannot fail
            let _ = writeln!(
                prompt,
                "Part of program {}, week {}, day {}. Progress the load over earlier weeks.",
                program.program_name, program.week, program.day
            );
        }
        prompt.push_str(
            "Include a warmup block, at least one work block and a cooldown block. \
             Durations are in seconds.\n",
        );
        prompt
    }
}

/// Anything that can author a session
pub trait WorkoutGenerator {
    /// `Ok(None)` means the service had nothing to offer
    fn generate(&self, request: &GenerationRequest) -> Result<Option<Session>>;
}

/// Reads a pre-authored session from a JSON file
pub struct FileGenerator {
    path: PathBuf,
}

impl FileGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WorkoutGenerator for FileGenerator {
    fn generate(&self, _request: &GenerationRequest) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Err(Error::Generation(format!(
                "Session file {:?} does not exist",
                self.path
            )));
        }
        Session::load(&self.path).map(Some)
    }
}

/// Generate a session, falling back to `fallback` on any failure
///
/// Generated sessions that fail validation count as failures.
pub fn resolve_session<G>(generator: &G, request: &GenerationRequest, fallback: &Session) -> Session
where
    G: WorkoutGenerator + ?Sized,
{
    match generator.generate(request) {
        Ok(Some(session)) => match session.validate() {
            Ok(()) => {
                tracing::info!("Using generated session {}", session.name);
                session
            }
            Err(e) => {
                tracing::warn!("Generated session rejected: {}. Using {}", e, fallback.name);
                fallback.clone()
            }
        },
        Ok(None) => {
            tracing::info!("No session generated, using {}", fallback.name);
            fallback.clone()
        }
        Err(e) => {
            tracing::warn!("Workout generation failed: {}. Using {}", e, fallback.name);
            fallback.clone()
        }
    }
}
