use athena_core::authoring::FileGenerator;
use athena_core::history::export_csv;
use athena_core::program::total_training_days;
use athena_core::*;
use clap::{Parser, Subcommand};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

const HISTORY_FILE: &str = "history.jsonl";
const PROGRAM_FILE: &str = "program.json";

#[derive(Parser)]
#[command(name = "athena")]
#[command(about = "Athena guided workout player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read settings from this file instead of the default config path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in sessions and programs
    List,

    /// Play a session in simulated time
    Play {
        /// Built-in session name; defaults to the active program's next day
        name: Option<String>,

        /// Load the session from an authored JSON file instead
        #[arg(long)]
        session_file: Option<PathBuf>,

        /// Seed for the biometric simulation
        #[arg(long)]
        seed: Option<u64>,

        /// Disable random jitter in the biometric simulation
        #[arg(long)]
        no_jitter: bool,

        /// Speak a voice command at a point in the workout, e.g. 30:pause
        #[arg(long = "say", value_name = "SECS:UTTERANCE", value_parser = parse_utterance)]
        say: Vec<ScriptedUtterance>,

        /// Do not record the finished workout
        #[arg(long)]
        no_save: bool,

        /// Spoken reply to the save prompt, e.g. "discard"; saves when absent
        #[arg(long, value_name = "UTTERANCE")]
        answer: Option<String>,

        /// Seconds to recover after a safety alert before resuming
        #[arg(long, default_value_t = 15)]
        recovery_secs: u64,
    },

    /// Show finished workouts, newest first
    History {
        /// Also append the history to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Manage the active multi-week program
    Program {
        #[command(subcommand)]
        action: ProgramAction,
    },
}

#[derive(Subcommand)]
enum ProgramAction {
    /// Start a program from week 1, day 1
    Start { id: String },
    /// Show progress through the active program
    Status,
    /// Mark the current day as done
    Complete,
    /// Abandon the active program
    Quit,
}

#[derive(Clone, Debug)]
struct ScriptedUtterance {
    at: Duration,
    text: String,
}

fn parse_utterance(raw: &str) -> std::result::Result<ScriptedUtterance, String> {
    let (secs, text) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected SECS:UTTERANCE, got '{}'", raw))?;
    let secs: u64 = secs
        .trim()
        .parse()
        .map_err(|e| format!("invalid seconds '{}': {}", secs, e))?;
    let text = text.trim();
    if text.is_empty() {
        return Err("utterance is empty".into());
    }
    Ok(ScriptedUtterance {
        at: Duration::from_secs(secs),
        text: text.to_string(),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        athena_core::logging::init_with_level("debug");
    } else {
        athena_core::logging::init();
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Configuration("Invalid catalog".into()));
    }

    match cli.command {
        Commands::List => cmd_list(catalog),
        Commands::Play {
            name,
            session_file,
            seed,
            no_jitter,
            say,
            no_save,
            answer,
            recovery_secs,
        } => {
            if seed.is_some() {
                config.monitor.seed = seed;
            }
            if no_jitter {
                config.monitor.jitter = false;
            }
            let options = PlayOptions {
                script: say,
                recovery: Duration::from_secs(recovery_secs),
                no_save,
                answer,
            };
            cmd_play(
                &data_dir,
                &config,
                catalog,
                name,
                session_file,
                options,
            )
        }
        Commands::History { csv } => cmd_history(&data_dir, csv),
        Commands::Program { action } => cmd_program(&data_dir, catalog, action),
    }
}

// ============================================================================
// list
// ============================================================================

fn cmd_list(catalog: &Catalog) -> Result<()> {
    println!("Sessions:");
    for session in &catalog.sessions {
        println!(
            "  {:<20} {:<7} {}",
            session.name,
            format!("{:?}", session.intensity).to_lowercase(),
            format_duration(session.total_duration_seconds())
        );
    }

    println!();
    println!("Programs:");
    for program in &catalog.programs {
        println!(
            "  {:<24} {} ({} weeks, {} training days)",
            program.id,
            program.name,
            program.duration_weeks,
            total_training_days(program)
        );
    }
    Ok(())
}

// ============================================================================
// play
// ============================================================================

struct PlayOptions {
    script: Vec<ScriptedUtterance>,
    recovery: Duration,
    no_save: bool,
    answer: Option<String>,
}

const SAVE_PROMPT: &str = "Save this workout?";

/// Prints narration to stdout
struct ConsoleNarrator;

impl Narrator for ConsoleNarrator {
    fn speak(&mut self, text: &str, style: VoiceStyle) -> Result<()> {
        let label = match style {
            VoiceStyle::Motivational => "coach",
            VoiceStyle::Calm => "calm",
            VoiceStyle::Commanding => "ALERT",
            VoiceStyle::Technical => "cue",
        };
        println!("[{}] {}", label, text);
        Ok(())
    }
}

fn cmd_play(
    data_dir: &Path,
    config: &Config,
    catalog: &Catalog,
    name: Option<String>,
    session_file: Option<PathBuf>,
    options: PlayOptions,
) -> Result<()> {
    let program_path = data_dir.join(PROGRAM_FILE);
    let mut tracker = ProgramTracker::load(&program_path)?;
    let program_day = if name.is_none() {
        tracker.current_day(catalog).cloned()
    } else {
        None
    };

    let goal = match program_day.as_ref().map(|d| d.goal) {
        Some(DayGoal::Train(goal)) => goal,
        _ => WorkoutGoal::Strength,
    };

    let fallback = match &name {
        Some(name) => catalog
            .find_session(name)
            .ok_or_else(|| Error::Other(format!("Unknown session: {}", name)))?,
        None if session_file.is_some() || program_day.is_some() => catalog
            .fallback_for_goal(goal)
            .ok_or_else(|| Error::Other("Catalog has no sessions".into()))?,
        None => {
            return Err(Error::Other(
                "No session given and no active program. See `athena list`.".into(),
            ))
        }
    };

    let session = match &session_file {
        Some(path) => {
            let request = GenerationRequest::new(goal, 30);
            resolve_session(&FileGenerator::new(path), &request, fallback)
        }
        None => fallback.clone(),
    };

    if let Some(day) = &program_day {
        println!("Program day: {}", day.title);
    }
    println!(
        "Playing {} ({})",
        session.name,
        format_duration(session.total_duration_seconds())
    );

    match play(session, config, catalog, &options)? {
        Some(record) => {
            println!(
                "Finished {} in {}",
                record.workout_name,
                format_duration(u64::from(record.duration_seconds))
            );
            if options.no_save {
                println!("Not saved (--no-save)");
            } else if confirm_save(options.answer.as_deref())? {
                let mut history = JsonlHistory::new(data_dir.join(HISTORY_FILE));
                history.append(&record)?;
                println!("Saved to history");
            } else {
                println!("Discarded");
            }
            if program_day.is_some() {
                tracker.complete_day(catalog)?;
                tracker.save(&program_path)?;
                if tracker.is_complete() {
                    println!("Program complete!");
                }
            }
        }
        None => println!("Workout stopped before the end"),
    }
    Ok(())
}

/// Ask whether to keep the finished workout; anything but a clear "discard"
/// keeps it
fn confirm_save(answer: Option<&str>) -> Result<bool> {
    let Some(answer) = answer else {
        return Ok(true);
    };

    ConsoleNarrator.speak(SAVE_PROMPT, VoiceStyle::Technical)?;
    println!("> \"{}\"", answer);
    match CommandSet::confirmation_set().recognize(answer) {
        Some(Command::Discard) => Ok(false),
        Some(_) => Ok(true),
        None => {
            println!("  (not understood, saving)");
            Ok(true)
        }
    }
}

/// Drive a player to the end, feeding scripted voice commands on the way
///
/// The player keeps the record in memory; the caller decides whether it
/// reaches the history file.
fn play(
    session: Session,
    config: &Config,
    catalog: &Catalog,
    options: &PlayOptions,
) -> Result<Option<WorkoutRecord>> {
    let total = session.total_duration_seconds();
    let mut player =
        WorkoutPlayer::new(session, config, ConsoleNarrator, Vec::<WorkoutRecord>::new())?
            .with_commands(CommandSet::default_set(catalog));

    let mut script: Vec<_> = options.script.clone();
    script.sort_by_key(|u| u.at);
    let mut script = VecDeque::from(script);

    // Generous ceiling so repeated recoveries cannot loop forever
    let deadline = Duration::from_secs(total * 4 + 3600);
    let mut recovery_until: Option<Duration> = None;

    player.start();
    while player.engine().phase() != Phase::Finished && player.now() < deadline {
        if !player.is_paused_for_safety() {
            recovery_until = None;
        }

        if let Some(next) = script.front() {
            if next.at <= player.now() {
                let utterance = script.pop_front().map(|u| u.text).unwrap_or_default();
                println!("> \"{}\"", utterance);
                match player.handle_utterance(&utterance) {
                    None => println!("  (not understood)"),
                    Some(Command::Pause | Command::Resume) => {}
                    Some(Command::GoBack) => {
                        player.reset();
                        println!("Workout abandoned");
                        break;
                    }
                    Some(_) => println!("  (not available during a workout)"),
                }
                continue;
            }
        }

        let until = script.front().map(|u| u.at).unwrap_or(deadline).min(deadline);
        if player.engine().is_running() {
            player.run_until_stopped(until - player.now());
        } else if player.is_paused_for_safety() {
            let now = player.now();
            let resume_at = *recovery_until.get_or_insert_with(|| {
                println!("Recovering for {}s", options.recovery.as_secs());
                now + options.recovery
            });
            if now >= resume_at {
                println!("Recovered, resuming");
                recovery_until = None;
                player.start();
            } else {
                player.run_for(resume_at.min(until) - now);
            }
        } else if !script.is_empty() {
            player.run_for(until - player.now());
        } else {
            println!(
                "Workout left paused at {:.0}%",
                player.engine().progress() * 100.0
            );
            break;
        }
    }

    tracing::debug!("Player stopped at {:?}", player.now());
    Ok(player.last_record().cloned())
}

// ============================================================================
// history
// ============================================================================

fn cmd_history(data_dir: &Path, csv: Option<PathBuf>) -> Result<()> {
    let records = read_history(&data_dir.join(HISTORY_FILE))?;

    if records.is_empty() {
        println!("No workouts yet.");
        return Ok(());
    }

    for record in &records {
        println!(
            "  {}  {:<20} {}",
            record
                .date
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            record.workout_name,
            format_duration(u64::from(record.duration_seconds))
        );
    }

    if let Some(csv_path) = csv {
        let count = export_csv(&records, &csv_path)?;
        println!("✓ Exported {} workouts to {}", count, csv_path.display());
    }
    Ok(())
}

// ============================================================================
// program
// ============================================================================

fn cmd_program(data_dir: &Path, catalog: &Catalog, action: ProgramAction) -> Result<()> {
    let path = data_dir.join(PROGRAM_FILE);

    match action {
        ProgramAction::Start { id } => {
            let tracker = ProgramTracker::update(&path, |t| t.start(catalog, &id).map(|_| ()))?;
            println!("✓ Started {}", id);
            print_program_status(&tracker, catalog);
        }
        ProgramAction::Status => {
            let tracker = ProgramTracker::load(&path)?;
            print_program_status(&tracker, catalog);
        }
        ProgramAction::Complete => {
            let tracker = ProgramTracker::update(&path, |t| t.complete_day(catalog))?;
            println!("✓ Day complete");
            print_program_status(&tracker, catalog);
        }
        ProgramAction::Quit => {
            ProgramTracker::update(&path, |t| {
                t.quit();
                Ok(())
            })?;
            println!("✓ Program quit");
        }
    }
    Ok(())
}

fn print_program_status(tracker: &ProgramTracker, catalog: &Catalog) {
    let Some(state) = &tracker.active else {
        println!("No active program.");
        return;
    };
    let Some(program) = catalog.find_program(&state.program_id) else {
        println!("Active program {} is not in the catalog.", state.program_id);
        return;
    };

    println!("Program: {}", program.name);
    println!(
        "Progress: {}/{} days",
        tracker.completed_days(catalog),
        total_training_days(program)
    );
    if tracker.is_complete() {
        println!("Program complete!");
    } else if let Some(day) = tracker.current_day(catalog) {
        println!(
            "Next: week {} day {} - {}",
            state.current_week, state.current_day, day.title
        );
    }
}

fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
