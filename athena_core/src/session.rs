//! Session model helpers: derived durations, validation and JSON loading.

use crate::{Block, Error, Exercise, Result, Session};
use std::path::Path;

impl Block {
    /// Seconds of exercise in one pass through the block
    pub fn round_duration_seconds(&self) -> u64 {
        self.exercises
            .iter()
            .map(|e| u64::from(e.duration_seconds))
            .sum()
    }

    /// Seconds the whole block takes, rest between rounds included
    ///
    /// Rest applies between rounds only, never after the last one.
    pub fn total_duration_seconds(&self) -> u64 {
        let rounds = u64::from(self.rounds);
        let rests = rounds.saturating_sub(1) * u64::from(self.rest_between_rounds_seconds);
        rounds * self.round_duration_seconds() + rests
    }
}

impl Session {
    /// Total session length in seconds, derived from the blocks
    pub fn total_duration_seconds(&self) -> u64 {
        self.blocks.iter().map(Block::total_duration_seconds).sum()
    }

    /// First exercise of the first block, if the session has one
    pub fn first_exercise(&self) -> Option<&Exercise> {
        self.blocks.first().and_then(|b| b.exercises.first())
    }

    /// Check the structural rules every engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(Error::Configuration(format!(
                "session '{}' has no blocks",
                self.name
            )));
        }

        for (index, block) in self.blocks.iter().enumerate() {
            if block.rounds == 0 {
                return Err(Error::Configuration(format!(
                    "block {} of '{}' has zero rounds",
                    index, self.name
                )));
            }
            if block.exercises.is_empty() {
                return Err(Error::Configuration(format!(
                    "block {} of '{}' has no exercises",
                    index, self.name
                )));
            }
            if let Some(exercise) = block.exercises.iter().find(|e| e.duration_seconds == 0) {
                return Err(Error::Configuration(format!(
                    "exercise '{}' in block {} of '{}' has zero duration",
                    exercise.name, index, self.name
                )));
            }
        }

        Ok(())
    }

    /// Parse and validate a session from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Session = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    /// Load a session file written by the authoring service
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let session = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded session '{}' ({} blocks) from {:?}",
            session.name,
            session.blocks.len(),
            path
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockPhase, Intensity};

    fn session_with(blocks: Vec<Block>) -> Session {
        Session {
            name: "Test".into(),
            description: "test session".into(),
            intensity: Intensity::Medium,
            blocks,
        }
    }

    #[test]
    fn test_total_duration_counts_rest_between_rounds_only() {
        let session = session_with(vec![
            Block::new(BlockPhase::Warmup, vec![Exercise::new("Jacks", 30)]),
            Block::new(
                BlockPhase::Work,
                vec![Exercise::new("Squat", 10), Exercise::new("Push-up", 10)],
            )
            .with_rounds(3, 5),
        ]);

        // 30 + 3 * 20 + 2 * 5
        assert_eq!(session.total_duration_seconds(), 100);
    }

    #[test]
    fn test_single_round_block_ignores_rest() {
        let block =
            Block::new(BlockPhase::Cooldown, vec![Exercise::new("Stretch", 45)]).with_rounds(1, 60);
        assert_eq!(block.total_duration_seconds(), 45);
    }

    #[test]
    fn test_validate_rejects_empty_blocks() {
        let err = session_with(vec![]).validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_empty_exercises() {
        let session = session_with(vec![Block::new(BlockPhase::Work, vec![])]);
        assert!(matches!(session.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_zero_duration_and_zero_rounds() {
        let zero_duration = session_with(vec![Block::new(
            BlockPhase::Work,
            vec![Exercise::new("Nothing", 0)],
        )]);
        assert!(zero_duration.validate().is_err());

        let zero_rounds = session_with(vec![
            Block::new(BlockPhase::Work, vec![Exercise::new("Squat", 10)]).with_rounds(0, 0)
        ]);
        assert!(zero_rounds.validate().is_err());
    }

    #[test]
    fn test_from_json_authoring_shape() {
        let json = r#"{
            "name": "Lunch Burner",
            "description": "Quick one",
            "intensity": "high",
            "blocks": [
                { "type": "warmup", "rounds": 1, "restBetweenRounds": null,
                  "exercises": [{ "name": "Jog", "duration": 60 }] },
                { "type": "work", "rounds": 2, "restBetweenRounds": 15,
                  "exercises": [{ "name": "Burpees", "duration": 30 }] },
                { "type": "cooldown", "rounds": 1,
                  "exercises": [{ "name": "Stretch", "duration": 60 }] }
            ]
        }"#;

        let session = Session::from_json(json).unwrap();
        assert_eq!(session.intensity, Intensity::High);
        assert_eq!(session.blocks[0].rest_between_rounds_seconds, 0);
        assert_eq!(session.blocks[1].rest_between_rounds_seconds, 15);
        assert_eq!(session.blocks[2].rest_between_rounds_seconds, 0);
        assert_eq!(session.total_duration_seconds(), 60 + 60 + 15 + 60);
    }

    #[test]
    fn test_from_json_rejects_invalid_session() {
        let json = r#"{ "name": "Empty", "description": "", "intensity": "low", "blocks": [] }"#;
        assert!(matches!(
            Session::from_json(json),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        let session = session_with(vec![Block::new(
            BlockPhase::Work,
            vec![Exercise::new("Plank", 40)],
        )]);
        std::fs::write(&path, serde_json::to_string(&session).unwrap()).unwrap();

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded, session);
    }
}
