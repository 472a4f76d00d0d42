//! Workout player.
//!
//! Wires one [`WorkoutEngine`] and one [`BiometricMonitor`] to a single
//! cooperative [`Scheduler`]:
//!
//! - the monitor timer lives as long as the player
//! - exactly one engine timer exists while the engine runs; it is created
//!   on start and cancelled on pause, reset and finish
//!
//! Events raised by either component are buffered in an [`EventLog`] and
//! dispatched right after the call that raised them, so the monitor always
//! sees the phase the engine reported last.

use crate::commands::{Command, CommandSet};
use crate::config::Config;
use crate::engine::WorkoutEngine;
use crate::events::{EventLog, WorkoutEvent};
use crate::history::HistorySink;
use crate::monitor::BiometricMonitor;
use crate::narration::{intro_line, transition_line, Narrator, FINISH_LINE};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::{FeedbackEvent, Phase, Result, Session, VoiceStyle, WorkoutRecord};
use std::time::Duration;

pub struct WorkoutPlayer<N: Narrator, H: HistorySink> {
    scheduler: Scheduler,
    engine: WorkoutEngine<EventLog>,
    monitor: BiometricMonitor<EventLog>,
    narrator: N,
    history: H,
    controls: CommandSet,
    tick_interval: Duration,
    engine_timer: Option<TimerHandle>,
    monitor_timer: TimerHandle,
    entry_announced: bool,
    caption: Option<String>,
    last_record: Option<WorkoutRecord>,
    paused_for_safety: bool,
}

impl<N: Narrator, H: HistorySink> WorkoutPlayer<N, H> {
    /// Validate `session` and register the monitor's sampling timer
    pub fn new(session: Session, config: &Config, narrator: N, history: H) -> Result<Self> {
        let engine = WorkoutEngine::with_config(session, EventLog::new(), &config.engine)?;
        let monitor = BiometricMonitor::new(&config.monitor, EventLog::new());

        let mut scheduler = Scheduler::new();
        let monitor_timer = scheduler.schedule_repeating(config.monitor.sample_interval());

        Ok(Self {
            scheduler,
            engine,
            monitor,
            narrator,
            history,
            controls: CommandSet::workout_controls(),
            tick_interval: config.engine.tick_interval(),
            engine_timer: None,
            monitor_timer,
            entry_announced: false,
            caption: None,
            last_record: None,
            paused_for_safety: false,
        })
    }

    /// Replace the phrases understood by [`handle_utterance`](Self::handle_utterance)
    pub fn with_commands(mut self, controls: CommandSet) -> Self {
        self.controls = controls;
        self
    }

    // ========================================================================
    // Controls
    // ========================================================================

    /// Start a fresh run or resume a paused one
    pub fn start(&mut self) {
        if self.engine.is_running() {
            tracing::debug!("Start ignored, already running");
            return;
        }

        if matches!(self.engine.phase(), Phase::Idle | Phase::Finished) {
            let intro = intro_line(self.engine.session());
            self.say(&intro, VoiceStyle::Technical);
            self.entry_announced = false;
            self.last_record = None;
            self.monitor.begin_session(self.scheduler.now());
        }

        self.paused_for_safety = false;
        self.engine.start();
        if self.engine_timer.is_none() {
            self.engine_timer = Some(self.scheduler.schedule_repeating(self.tick_interval));
        }
        self.monitor.set_active(true, self.scheduler.now());
        self.dispatch();
    }

    pub fn pause(&mut self) {
        self.engine.pause();
        self.stop_engine_timer();
        self.monitor.set_active(false, self.scheduler.now());
    }

    /// Back to idle; nothing is recorded
    pub fn reset(&mut self) {
        self.engine.reset();
        self.stop_engine_timer();
        self.monitor.set_active(false, self.scheduler.now());
        self.monitor.set_phase(Phase::Idle);
        self.caption = None;
        self.paused_for_safety = false;
        self.dispatch();
    }

    /// Act on a spoken phrase
    ///
    /// Pause and resume are handled here. Every recognized command is
    /// returned so callers can act on the rest.
    pub fn handle_utterance(&mut self, transcript: &str) -> Option<Command> {
        let command = self.controls.recognize(transcript)?;
        match command {
            Command::Pause => self.pause(),
            Command::Resume => self.start(),
            _ => {}
        }
        Some(command)
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Fire every timer due within the next `duration` of virtual time
    pub fn run_for(&mut self, duration: Duration) {
        let deadline = self.scheduler.now() + duration;

        while let Some(handle) = self.scheduler.next_due_before(deadline) {
            if Some(handle) == self.engine_timer {
                self.engine.tick();
            } else if handle == self.monitor_timer {
                self.monitor.tick(self.scheduler.now());
            } else {
                tracing::warn!("Unknown timer {:?} fired", handle);
            }
            self.dispatch();
        }

        self.scheduler.advance_to(deadline);
    }

    /// Run until the engine stops or `limit` of virtual time has passed
    ///
    /// Returns true when the workout finished.
    pub fn run_until_stopped(&mut self, limit: Duration) -> bool {
        let deadline = self.scheduler.now() + limit;
        while self.engine.is_running() && self.scheduler.now() < deadline {
            let step = self.tick_interval.min(deadline - self.scheduler.now());
            self.run_for(step);
        }
        self.engine.phase() == Phase::Finished
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn dispatch(&mut self) {
        for event in self.engine.listener_mut().drain() {
            if let WorkoutEvent::PhaseChanged { phase, exercise } = event {
                self.on_phase_change(phase, &exercise);
            }
        }

        for event in self.monitor.listener_mut().drain() {
            match event {
                WorkoutEvent::Feedback(feedback) => self.on_feedback(feedback),
                WorkoutEvent::SafetyAlert(message) => self.on_safety_alert(&message),
                WorkoutEvent::PhaseChanged { .. } => {}
            }
        }
    }

    fn on_phase_change(&mut self, phase: Phase, exercise: &str) {
        self.monitor.set_phase(phase);
        self.caption = Some(exercise.to_string());

        if phase == Phase::Finished {
            self.finish();
            return;
        }

        // The intro already named the first exercise
        if !self.entry_announced {
            self.entry_announced = true;
            return;
        }

        if let Some(line) = transition_line(phase, exercise) {
            self.say(&line, VoiceStyle::Technical);
        }
    }

    fn finish(&mut self) {
        self.stop_engine_timer();
        self.monitor.set_active(false, self.scheduler.now());

        let seconds = u32::try_from(self.engine.elapsed_seconds()).unwrap_or(u32::MAX);
        let record = WorkoutRecord::new(self.engine.session().name.clone(), seconds);
        match self.history.append(&record) {
            Ok(()) => tracing::info!("Recorded '{}' ({}s)", record.workout_name, seconds),
            Err(e) => tracing::warn!("Failed to record workout: {}", e),
        }
        self.last_record = Some(record);

        self.say(FINISH_LINE, VoiceStyle::Motivational);
    }

    fn on_feedback(&mut self, feedback: FeedbackEvent) {
        self.caption = Some(feedback.message.clone());
        self.say(&feedback.message, VoiceStyle::from(feedback.kind));
    }

    fn on_safety_alert(&mut self, message: &str) {
        tracing::warn!("Safety alert: {}", message);
        self.pause();
        self.paused_for_safety = true;
        self.caption = Some(message.to_string());
        self.say(message, VoiceStyle::Commanding);
    }

    fn stop_engine_timer(&mut self) {
        if let Some(handle) = self.engine_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn say(&mut self, text: &str, style: VoiceStyle) {
        if let Err(e) = self.narrator.speak(text, style) {
            tracing::warn!("Narration failed for {:?}: {}", text, e);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn engine(&self) -> &WorkoutEngine<EventLog> {
        &self.engine
    }

    pub fn monitor(&self) -> &BiometricMonitor<EventLog> {
        &self.monitor
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Latest exercise name or coaching message
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Record written when the last run finished
    pub fn last_record(&self) -> Option<&WorkoutRecord> {
        self.last_record.as_ref()
    }

    /// True while paused by a safety alert and not yet resumed
    pub fn is_paused_for_safety(&self) -> bool {
        self.paused_for_safety
    }

    pub fn has_engine_timer(&self) -> bool {
        self.engine_timer
            .map(|h| self.scheduler.is_scheduled(h))
            .unwrap_or(false)
    }

    /// Timers currently registered with the scheduler
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::SAFETY_ALERT_MESSAGE;
    use crate::narration::Transcript;
    use crate::{Block, BlockPhase, Error, Exercise, Intensity};

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.monitor.jitter = false;
        config.monitor.seed = Some(7);
        config.monitor.sample_interval_secs = 3600;
        config
    }

    fn squat_pushup() -> Session {
        Session {
            name: "Test".into(),
            description: String::new(),
            intensity: Intensity::Medium,
            blocks: vec![Block::new(
                BlockPhase::Work,
                vec![Exercise::new("Squats", 2), Exercise::new("Pushups", 2)],
            )
            .with_rounds(2, 1)],
        }
    }

    fn player(
        session: Session,
        config: &Config,
    ) -> WorkoutPlayer<Transcript, Vec<WorkoutRecord>> {
        WorkoutPlayer::new(session, config, Transcript::default(), Vec::new()).unwrap()
    }

    struct BrokenSpeaker;

    impl Narrator for BrokenSpeaker {
        fn speak(&mut self, _text: &str, _style: VoiceStyle) -> Result<()> {
            Err(Error::Narration("speaker unplugged".into()))
        }
    }

    #[test]
    fn test_invalid_session_rejected() {
        let mut session = squat_pushup();
        session.blocks.clear();
        let result = WorkoutPlayer::new(
            session,
            &quiet_config(),
            Transcript::default(),
            Vec::<WorkoutRecord>::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_single_engine_timer() {
        let mut player = player(squat_pushup(), &quiet_config());
        assert_eq!(player.pending_timers(), 1);

        player.start();
        player.start();
        assert_eq!(player.pending_timers(), 2);
        assert!(player.has_engine_timer());

        player.pause();
        player.pause();
        assert_eq!(player.pending_timers(), 1);
        assert!(!player.has_engine_timer());

        player.start();
        assert_eq!(player.pending_timers(), 2);
    }

    #[test]
    fn test_narration_order() {
        crate::logging::init_test();
        let mut player = player(squat_pushup(), &quiet_config());
        player.start();
        assert!(player.run_until_stopped(Duration::from_secs(60)));

        assert_eq!(
            player.narrator().texts(),
            vec![
                "Get ready for Test. The first exercise is Squats.",
                "Pushups",
                "Rest. Next up: Squats",
                "Squats",
                "Pushups",
                FINISH_LINE,
            ]
        );
        let last = player.narrator().lines.last().unwrap();
        assert_eq!(last.1, VoiceStyle::Motivational);
    }

    #[test]
    fn test_finish_records_active_duration() {
        let mut player = player(squat_pushup(), &quiet_config());
        player.start();
        player.run_for(Duration::from_secs(3));
        player.pause();
        player.run_for(Duration::from_secs(100));
        assert_eq!(player.engine().elapsed_seconds(), 3);

        player.start();
        player.run_for(Duration::from_secs(30));

        assert_eq!(player.engine().phase(), Phase::Finished);
        assert_eq!(player.history().len(), 1);
        assert_eq!(player.history()[0].workout_name, "Test");
        assert_eq!(player.history()[0].duration_seconds, 9);
        assert_eq!(player.last_record().unwrap().duration_seconds, 9);
        assert_eq!(player.pending_timers(), 1);
    }

    #[test]
    fn test_monitor_follows_engine() {
        let mut player = player(squat_pushup(), &quiet_config());
        assert!(!player.monitor().is_active());

        player.start();
        assert_eq!(player.monitor().phase(), Phase::Work);
        assert!(player.monitor().is_active());
        assert_eq!(player.caption(), Some("Squats"));

        player.pause();
        assert!(!player.monitor().is_active());

        player.start();
        player.run_for(Duration::from_secs(30));
        assert_eq!(player.monitor().phase(), Phase::Finished);
        assert!(!player.monitor().is_active());
    }

    #[test]
    fn test_voice_pause_and_resume() {
        let mut player = player(squat_pushup(), &quiet_config());
        player.start();

        assert_eq!(player.handle_utterance("Pause workout"), Some(Command::Pause));
        assert!(!player.engine().is_running());
        assert!(!player.has_engine_timer());

        assert_eq!(player.handle_utterance("okay resume"), Some(Command::Resume));
        assert!(player.engine().is_running());
        assert!(player.has_engine_timer());

        assert_eq!(player.handle_utterance("show history"), None);
    }

    #[test]
    fn test_reset_returns_to_idle_without_record() {
        let mut player = player(squat_pushup(), &quiet_config());
        player.start();
        player.run_for(Duration::from_secs(3));
        player.reset();

        assert_eq!(player.engine().phase(), Phase::Idle);
        assert_eq!(player.monitor().phase(), Phase::Idle);
        assert_eq!(player.pending_timers(), 1);
        assert!(player.history().is_empty());
        assert!(player.caption().is_none());
    }

    #[test]
    fn test_restart_after_finish_reannounces_intro() {
        let mut player = player(squat_pushup(), &quiet_config());
        player.start();
        player.run_until_stopped(Duration::from_secs(60));
        player.start();

        let texts = player.narrator().texts();
        assert_eq!(texts.last().copied(), Some(texts[0]));
        assert!(player.last_record().is_none());
        assert_eq!(player.history().len(), 1);
    }

    #[test]
    fn test_restart_begins_new_monitor_session() {
        let mut config = quiet_config();
        config.monitor.sample_interval_secs = 5;
        let session = Session {
            name: "Loosen Up".into(),
            description: String::new(),
            intensity: Intensity::Low,
            blocks: vec![Block::new(
                BlockPhase::Warmup,
                vec![Exercise::new("Arm Circles", 20)],
            )],
        };
        let mut player = player(session, &config);
        player.start();
        assert!(player.run_until_stopped(Duration::from_secs(60)));
        assert!(!player.monitor().fatigue_history().is_empty());

        player.run_for(Duration::from_secs(900));
        let restart_at = player.now();
        player.start();

        assert_eq!(player.monitor().session_started_at(), Some(restart_at));
        assert!(player.monitor().fatigue_history().is_empty());

        player.run_for(Duration::from_secs(10));
        assert!(!player
            .narrator()
            .texts()
            .iter()
            .any(|t| t.contains("hydrated")));
    }

    #[test]
    fn test_safety_alert_pauses_and_commands() {
        crate::logging::init_test();
        let mut config = quiet_config();
        config.monitor.sample_interval_secs = 5;
        config.monitor.feedback_cooldown_secs = 3600;

        let session = Session {
            name: "Long Run".into(),
            description: String::new(),
            intensity: Intensity::High,
            blocks: vec![Block::new(BlockPhase::Work, vec![Exercise::new("Run", 600)])],
        };
        let mut player = player(session, &config);
        player.start();

        // Heart rate climbs toward the work target and the index spikes as
        // soon as the fatigue window fills at the twelfth sample. The monitor
        // timer was registered first, so it fires before the engine at 60s.
        player.run_for(Duration::from_secs(60));

        assert!(player.is_paused_for_safety());
        assert!(!player.engine().is_running());
        assert!(!player.has_engine_timer());
        assert_eq!(player.engine().elapsed_seconds(), 59);
        assert!(player
            .narrator()
            .lines
            .contains(&(SAFETY_ALERT_MESSAGE.to_string(), VoiceStyle::Commanding)));

        player.start();
        assert!(!player.is_paused_for_safety());
        assert!(player.engine().is_running());
    }

    #[test]
    fn test_narration_failure_does_not_stop_workout() {
        let history: Vec<WorkoutRecord> = Vec::new();
        let mut player =
            WorkoutPlayer::new(squat_pushup(), &quiet_config(), BrokenSpeaker, history).unwrap();
        player.start();
        assert!(player.run_until_stopped(Duration::from_secs(60)));
        assert_eq!(player.history().len(), 1);
    }
}
