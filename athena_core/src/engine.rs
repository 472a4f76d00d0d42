//! Workout execution engine.
//!
//! A one-second countdown walks the session's blocks, rounds and exercises:
//!
//! 1. **Exercise done** → next exercise of the block, same phase
//! 2. **Round done** → `rest` between rounds, then the block starts over
//! 3. **Block done** → first exercise of the next block
//! 4. **Last block done** → `finished`, the timer stops
//!
//! Every transition is reported to the engine's [`PhaseListener`] before the
//! call that caused it returns. The engine never owns a timer itself; the
//! driver calls [`WorkoutEngine::tick`] once per tick interval while
//! [`WorkoutEngine::is_running`] holds.

use crate::config::EngineConfig;
use crate::events::PhaseListener;
use crate::{Block, Exercise, Phase, Result, Session};

/// Label reported with the `finished` transition
pub const FINISHED_LABEL: &str = "Workout Complete";

/// Mutable position of the engine inside its session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineState {
    pub phase: Phase,
    pub block_index: usize,
    pub round_index: u32,
    pub exercise_index: usize,
    pub time_remaining_seconds: u64,
    pub running: bool,
}

/// Timer-driven state machine over a validated [`Session`]
pub struct WorkoutEngine<L: PhaseListener> {
    session: Session,
    listener: L,
    state: EngineState,
    total_seconds: u64,
    elapsed_seconds: u64,
    emit_zero_length_rest: bool,
}

impl<L: PhaseListener> WorkoutEngine<L> {
    /// Build an engine with default engine settings
    ///
    /// Fails with `Error::Configuration` if the session is not runnable.
    pub fn new(session: Session, listener: L) -> Result<Self> {
        Self::with_config(session, listener, &EngineConfig::default())
    }

    pub fn with_config(session: Session, listener: L, config: &EngineConfig) -> Result<Self> {
        session.validate()?;
        let total_seconds = session.total_duration_seconds();

        tracing::debug!(
            "Engine ready for '{}': {} blocks, {} seconds",
            session.name,
            session.blocks.len(),
            total_seconds
        );

        Ok(Self {
            session,
            listener,
            state: EngineState {
                phase: Phase::Idle,
                block_index: 0,
                round_index: 0,
                exercise_index: 0,
                time_remaining_seconds: total_seconds,
                running: false,
            },
            total_seconds,
            elapsed_seconds: 0,
            emit_zero_length_rest: config.emit_zero_length_rest,
        })
    }

    /// Start from the top, or resume a paused session
    ///
    /// From `idle` or `finished` the session is rewound and the entry
    /// transition fires before the engine is marked running. From any other
    /// phase this only resumes.
    pub fn start(&mut self) {
        match self.state.phase {
            Phase::Idle | Phase::Finished => {
                self.rewind();
                let first_phase = Phase::from(self.session.blocks[0].phase);
                tracing::info!("Starting '{}'", self.session.name);
                self.enter(first_phase, 0, 0);
            }
            Phase::Warmup | Phase::Work | Phase::Cooldown | Phase::Rest => {
                if !self.state.running {
                    tracing::info!("Resuming '{}' in {}", self.session.name, self.state.phase);
                }
            }
        }
        self.state.running = true;
    }

    /// Stop counting down; safe to call repeatedly
    pub fn pause(&mut self) {
        if self.state.running {
            tracing::info!("Paused '{}' in {}", self.session.name, self.state.phase);
        }
        self.state.running = false;
    }

    /// Return to `idle` with the full session time remaining
    ///
    /// Does not notify the listener.
    pub fn reset(&mut self) {
        self.rewind();
        self.state.phase = Phase::Idle;
        self.state.time_remaining_seconds = self.total_seconds;
        tracing::debug!("Reset '{}'", self.session.name);
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) {
        if !self.state.running {
            return;
        }

        self.elapsed_seconds += 1;
        if self.state.time_remaining_seconds > 1 {
            self.state.time_remaining_seconds -= 1;
        } else {
            self.state.time_remaining_seconds = 0;
            self.advance();
        }
    }

    fn rewind(&mut self) {
        self.state.running = false;
        self.state.block_index = 0;
        self.state.round_index = 0;
        self.state.exercise_index = 0;
        self.elapsed_seconds = 0;
    }

    /// Move to whatever follows the exhausted countdown
    fn advance(&mut self) {
        let block_index = self.state.block_index;
        let Some(block) = self.session.blocks.get(block_index) else {
            self.finish();
            return;
        };
        let block_phase = Phase::from(block.phase);
        let exercise_count = block.exercises.len();
        let rounds = block.rounds;
        let rest_seconds = u64::from(block.rest_between_rounds_seconds);

        // Rest is over: the new round starts at the block's first exercise.
        if self.state.phase == Phase::Rest {
            self.enter(block_phase, block_index, 0);
            return;
        }

        self.state.exercise_index += 1;
        if self.state.exercise_index < exercise_count {
            self.enter(block_phase, block_index, self.state.exercise_index);
            return;
        }

        self.state.exercise_index = 0;
        self.state.round_index += 1;
        if self.state.round_index < rounds {
            if rest_seconds > 0 || self.emit_zero_length_rest {
                self.enter_rest(block_index, rest_seconds);
            } else {
                tracing::debug!("No rest configured, starting round {}", self.state.round_index + 1);
                self.enter(block_phase, block_index, 0);
            }
            return;
        }

        self.state.round_index = 0;
        self.state.block_index += 1;
        match self.session.blocks.get(self.state.block_index) {
            Some(next) => {
                let next_phase = Phase::from(next.phase);
                self.enter(next_phase, self.state.block_index, 0);
            }
            None => self.finish(),
        }
    }

    /// Enter a phase and report it
    ///
    /// Exercise phases load the exercise's duration; rest keeps the time set
    /// by `enter_rest`.
    fn enter(&mut self, phase: Phase, block_index: usize, exercise_index: usize) {
        let exercise = &self.session.blocks[block_index].exercises[exercise_index];
        self.state.phase = phase;
        self.state.block_index = block_index;
        self.state.exercise_index = exercise_index;
        if phase != Phase::Rest {
            self.state.time_remaining_seconds = u64::from(exercise.duration_seconds);
        }

        tracing::debug!(
            "-> {} '{}' (block {}, round {}, {}s)",
            phase,
            exercise.name,
            block_index,
            self.state.round_index,
            self.state.time_remaining_seconds
        );
        self.listener.on_phase_change(phase, &exercise.name);
    }

    /// Rest between rounds, announcing the exercise that comes next
    fn enter_rest(&mut self, block_index: usize, seconds: u64) {
        self.state.time_remaining_seconds = seconds;
        self.enter(Phase::Rest, block_index, 0);
    }

    fn finish(&mut self) {
        self.state.phase = Phase::Finished;
        self.state.running = false;
        self.state.time_remaining_seconds = 0;
        tracing::info!(
            "Finished '{}' after {} seconds",
            self.session.name,
            self.elapsed_seconds
        );
        self.listener.on_phase_change(Phase::Finished, FINISHED_LABEL);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Seconds left in the current exercise or rest
    pub fn time_remaining(&self) -> u64 {
        self.state.time_remaining_seconds
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.total_seconds
    }

    /// Seconds ticked since the session was (re)started
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Seconds left across the whole session
    pub fn total_time_remaining(&self) -> u64 {
        match self.state.phase {
            Phase::Finished => 0,
            _ => self.total_seconds.saturating_sub(self.elapsed_seconds),
        }
    }

    /// Fraction of the session completed, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.state.phase == Phase::Finished {
            return 1.0;
        }
        if self.total_seconds == 0 {
            return 0.0;
        }
        (self.elapsed_seconds as f64 / self.total_seconds as f64).min(1.0)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Block the engine is in, `None` once finished
    pub fn current_block(&self) -> Option<&Block> {
        if self.state.phase == Phase::Finished {
            return None;
        }
        self.session.blocks.get(self.state.block_index)
    }

    /// Exercise being performed, or coming up next while resting
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.current_block()
            .and_then(|b| b.exercises.get(self.state.exercise_index))
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }
}
