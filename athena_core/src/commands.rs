//! Voice command recognition.
//!
//! A [`CommandSet`] maps spoken phrases to [`Command`]s. Transcripts are
//! normalized first (lower case, punctuation dropped, common mishearings
//! corrected); phrases then match as whole words anywhere in the
//! transcript. The first registered phrase that matches wins.

use crate::catalog::Catalog;

/// Action requested by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    /// Start a named session from the catalog
    StartSession(String),
    /// Start the active program's next day
    StartTodaysWorkout,
    GoBack,
    ShowHistory,
    Save,
    Discard,
}

#[derive(Clone, Debug)]
struct Phrase {
    words: Vec<String>,
    command: Command,
}

/// Ordered phrase table
#[derive(Clone, Debug, Default)]
pub struct CommandSet {
    phrases: Vec<Phrase>,
}

/// Speech engines regularly hear "HIIT" as one of these
const MISHEARINGS: &[(&str, &str)] = &[("hit blast", "hiit blast"), ("heat blast", "hiit blast")];

/// Lower-case, strip punctuation and fix known mishearings
pub fn normalize_transcript(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                Some(c.to_ascii_lowercase())
            } else if c == '-' {
                Some(' ')
            } else {
                None
            }
        })
        .collect();

    let mut normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    for (heard, meant) in MISHEARINGS {
        normalized = normalized.replace(heard, meant);
    }
    normalized
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a phrase; earlier registrations take priority
    pub fn register(&mut self, phrase: &str, command: Command) -> &mut Self {
        let words = normalize_transcript(phrase)
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if words.is_empty() {
            tracing::warn!("Ignoring empty voice command phrase");
        } else {
            self.phrases.push(Phrase { words, command });
        }
        self
    }

    /// Pause and resume only, for use while a workout is playing
    pub fn workout_controls() -> Self {
        let mut set = Self::new();
        set.register("pause workout", Command::Pause)
            .register("pause", Command::Pause)
            .register("resume workout", Command::Resume)
            .register("resume", Command::Resume);
        set
    }

    /// Everything the player understands outside the save prompt
    pub fn default_set(catalog: &Catalog) -> Self {
        let mut set = Self::workout_controls();
        set.register("start todays workout", Command::StartTodaysWorkout);
        for session in &catalog.sessions {
            set.register(
                &format!("start {}", session.name),
                Command::StartSession(session.name.clone()),
            );
        }
        set.register("go back", Command::GoBack)
            .register("return to main", Command::GoBack)
            .register("show history", Command::ShowHistory)
            .register("open history", Command::ShowHistory);
        set
    }

    /// Answers accepted while asking whether to save a finished workout
    pub fn confirmation_set() -> Self {
        let mut set = Self::new();
        set.register("save session", Command::Save)
            .register("save", Command::Save)
            .register("yes", Command::Save)
            .register("discard", Command::Discard)
            .register("no", Command::Discard);
        set
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Map a raw transcript to the first matching command
    pub fn recognize(&self, transcript: &str) -> Option<Command> {
        let normalized = normalize_transcript(transcript);
        let heard: Vec<&str> = normalized.split(' ').collect();

        let command = self
            .phrases
            .iter()
            .find(|p| {
                heard
                    .windows(p.words.len())
                    .any(|w| w.iter().zip(&p.words).all(|(a, b)| *a == b.as_str()))
            })
            .map(|p| p.command.clone());

        match &command {
            Some(c) => tracing::debug!("Recognized {:?} from {:?}", c, transcript),
            None => tracing::debug!("No command in {:?}", transcript),
        }
        command
    }
}
