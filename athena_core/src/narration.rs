//! Spoken cues.
//!
//! Text-to-speech is an external service hidden behind [`Narrator`]. This
//! module also owns the wording of the player's own cues.

use crate::{Phase, Result, Session, VoiceStyle};

pub const FINISH_LINE: &str = "Workout complete. Great job.";

/// Speaks text in a requested style
pub trait Narrator {
    fn speak(&mut self, text: &str, style: VoiceStyle) -> Result<()>;
}

/// Narrator that only writes to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNarrator;

impl Narrator for LogNarrator {
    fn speak(&mut self, text: &str, style: VoiceStyle) -> Result<()> {
        tracing::info!(style = ?style, "{}", text);
        Ok(())
    }
}

/// Narrator that keeps everything it was asked to say
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    pub lines: Vec<(String, VoiceStyle)>,
}

impl Transcript {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|(text, _)| text.as_str()).collect()
    }
}

impl Narrator for Transcript {
    fn speak(&mut self, text: &str, style: VoiceStyle) -> Result<()> {
        self.lines.push((text.to_string(), style));
        Ok(())
    }
}

/// Announcement made before the first exercise
pub fn intro_line(session: &Session) -> String {
    match session.first_exercise() {
        Some(first) => format!(
            "Get ready for {}. The first exercise is {}.",
            session.name, first.name
        ),
        None => format!("Get ready for {}.", session.name),
    }
}

/// Cue for a phase transition; `None` for phases that are not announced
pub fn transition_line(phase: Phase, exercise: &str) -> Option<String> {
    match phase {
        Phase::Rest => Some(format!("Rest. Next up: {}", exercise)),
        Phase::Warmup | Phase::Work | Phase::Cooldown => Some(exercise.to_string()),
        Phase::Idle | Phase::Finished => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;

    #[test]
    fn test_intro_names_first_exercise() {
        let session = get_default_catalog().find_session("HIIT Blast").unwrap();
        assert_eq!(
            intro_line(session),
            "Get ready for HIIT Blast. The first exercise is Butt Kicks."
        );
    }

    #[test]
    fn test_transition_lines() {
        assert_eq!(
            transition_line(Phase::Rest, "Burpees").as_deref(),
            Some("Rest. Next up: Burpees")
        );
        assert_eq!(transition_line(Phase::Work, "Burpees").as_deref(), Some("Burpees"));
        assert_eq!(transition_line(Phase::Finished, "Workout Complete"), None);
    }

    #[test]
    fn test_transcript_records_style() {
        let mut transcript = Transcript::default();
        transcript.speak("Deep breath", VoiceStyle::Calm).unwrap();
        assert_eq!(transcript.lines, vec![("Deep breath".to_string(), VoiceStyle::Calm)]);
        assert!(LogNarrator.speak("quiet", VoiceStyle::Technical).is_ok());
    }
}
